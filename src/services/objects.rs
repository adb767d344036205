//! Object collection operations (networks, ports, URLs, certificates, NAT,
//! routes).

use serde::{de::DeserializeOwned, Serialize};

use crate::error::FtdResult;
use crate::resilience::Invoker;
use crate::types::{ItemList, ListParams};

/// An FDM object collection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ObjectKind {
    Network,
    NetworkGroup,
    TcpPort,
    UdpPort,
    PortGroup,
    Url,
    UrlGroup,
    Secret,
    InternalCertificate,
    InternalCaCertificate,
    ExternalCertificate,
    SyslogServer,
    DnsServerGroup,
    ObjectNatPolicy,
    ManualNatPolicy,
    ObjectNatRule { policy: String },
    ManualNatRule { policy: String },
    VirtualRouter,
    StaticRoute { virtual_router: String },
}

impl ObjectKind {
    /// Collection path relative to the API prefix.
    pub fn path(&self) -> String {
        match self {
            Self::Network => "/object/networks".to_string(),
            Self::NetworkGroup => "/object/networkgroups".to_string(),
            Self::TcpPort => "/object/tcpports".to_string(),
            Self::UdpPort => "/object/udpports".to_string(),
            Self::PortGroup => "/object/portgroups".to_string(),
            Self::Url => "/object/urls".to_string(),
            Self::UrlGroup => "/object/urlgroups".to_string(),
            Self::Secret => "/object/secrets".to_string(),
            Self::InternalCertificate => "/object/internalcertificates".to_string(),
            Self::InternalCaCertificate => "/object/internalcacertificates".to_string(),
            Self::ExternalCertificate => "/object/externalcertificates".to_string(),
            Self::SyslogServer => "/object/syslogalerts".to_string(),
            Self::DnsServerGroup => "/object/dnsservergroups".to_string(),
            Self::ObjectNatPolicy => "/policy/objectnatpolicies".to_string(),
            Self::ManualNatPolicy => "/policy/manualnatpolicies".to_string(),
            Self::ObjectNatRule { policy } => {
                format!("/policy/objectnatpolicies/{}/objectnatrules", policy)
            }
            Self::ManualNatRule { policy } => {
                format!("/policy/manualnatpolicies/{}/manualnatrules", policy)
            }
            Self::VirtualRouter => "/devices/default/routing/virtualrouters".to_string(),
            Self::StaticRoute { virtual_router } => format!(
                "/devices/default/routing/virtualrouters/{}/staticrouteentries",
                virtual_router
            ),
        }
    }

    /// Name used in operation identities and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Network => "network_object",
            Self::NetworkGroup => "network_group",
            Self::TcpPort => "tcp_port_object",
            Self::UdpPort => "udp_port_object",
            Self::PortGroup => "port_group",
            Self::Url => "url_object",
            Self::UrlGroup => "url_group",
            Self::Secret => "secret",
            Self::InternalCertificate => "internal_certificate",
            Self::InternalCaCertificate => "internal_ca_certificate",
            Self::ExternalCertificate => "external_certificate",
            Self::SyslogServer => "syslog_server",
            Self::DnsServerGroup => "dns_server_group",
            Self::ObjectNatPolicy => "object_nat_policy",
            Self::ManualNatPolicy => "manual_nat_policy",
            Self::ObjectNatRule { .. } => "object_nat_rule",
            Self::ManualNatRule { .. } => "manual_nat_rule",
            Self::VirtualRouter => "virtual_router",
            Self::StaticRoute { .. } => "static_route",
        }
    }

    fn item_path(&self, id: &str) -> String {
        format!("{}/{}", self.path(), id)
    }
}

/// CRUD operations on one object collection, each run through the invoker.
pub struct ObjectService<'a> {
    invoker: &'a Invoker,
    kind: ObjectKind,
}

impl<'a> ObjectService<'a> {
    pub fn new(invoker: &'a Invoker, kind: ObjectKind) -> Self {
        Self { invoker, kind }
    }

    pub fn kind(&self) -> &ObjectKind {
        &self.kind
    }

    /// List objects.
    ///
    /// A `key:` filter with an empty value returns an empty list without
    /// contacting the device.
    pub async fn list<T: DeserializeOwned>(&self, params: &ListParams) -> FtdResult<Vec<T>> {
        if params.has_empty_filter_value() {
            tracing::debug!(kind = self.kind.name(), "Empty filter value, nothing to list");
            return Ok(Vec::new());
        }

        let path = &self.kind.path();
        let operation = format!("get_{}s", self.kind.name());
        let page: Option<ItemList<T>> = self
            .invoker
            .invoke(&operation, |api| async move { api.get(path, params.to_query()).await })
            .await?;

        Ok(page.map(|p| p.items).unwrap_or_default())
    }

    /// First object whose name matches exactly.
    pub async fn find_by_name<T: DeserializeOwned>(&self, name: &str) -> FtdResult<Option<T>> {
        let params = ListParams::default().filter(format!("name:{}", name));
        Ok(self.list(&params).await?.into_iter().next())
    }

    /// Get one object by id.
    pub async fn get<T: DeserializeOwned>(&self, id: &str) -> FtdResult<Option<T>> {
        let path = &self.kind.item_path(id);
        let operation = format!("get_{}", self.kind.name());
        self.invoker
            .invoke(&operation, |api| async move { api.get(path, Vec::new()).await })
            .await
    }

    /// Create an object. `None` means it already existed and the call was
    /// skipped.
    pub async fn create<B, T>(&self, body: &B) -> FtdResult<Option<T>>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let path = &self.kind.path();
        let operation = format!("create_{}", self.kind.name());
        self.invoker
            .invoke(&operation, |api| async move { api.post(path, body).await })
            .await
    }

    /// Replace an object.
    pub async fn edit<B, T>(&self, id: &str, body: &B) -> FtdResult<Option<T>>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let path = &self.kind.item_path(id);
        let operation = format!("edit_{}", self.kind.name());
        self.invoker
            .invoke(&operation, |api| async move { api.put(path, body).await })
            .await
    }

    pub async fn delete(&self, id: &str) -> FtdResult<()> {
        let path = &self.kind.item_path(id);
        let operation = format!("delete_{}", self.kind.name());
        self.invoker
            .invoke(&operation, |api| async move { api.delete(path).await })
            .await?;
        Ok(())
    }
}
