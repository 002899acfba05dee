use std::collections::BTreeMap;
use tracing::{debug, trace};
use ws_model::annotations::{self, AnnotationError};
use ws_model::k8s_openapi::api::core::v1::Service;
use ws_model::k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use ws_model::openshift::Route;
use ws_model::ServerConfig;

/// Groups objects by the machine name in their annotations, skipping
/// objects that were not created for a machine
fn index_by_machine<T>(objects: Vec<T>, meta: fn(&T) -> &ObjectMeta) -> BTreeMap<String, Vec<T>> {
    let mut index: BTreeMap<String, Vec<T>> = BTreeMap::new();
    for object in objects {
        let machine = annotations::new_deserializer(meta(&object).annotations.as_ref())
            .machine_name()
            .map(str::to_string);
        match machine {
            Some(machine) => index.entry(machine).or_default().push(object),
            None => trace!(
                "Skipping {:?}: no machine name annotation",
                meta(&object).name
            ),
        }
    }
    index
}

/// Resolves the servers of a machine from the Services (internal servers)
/// and Routes (external servers) created for it.
#[derive(Debug, Clone, Default)]
pub struct ServerResolver {
    services: BTreeMap<String, Vec<Service>>,
    routes: BTreeMap<String, Vec<Route>>,
}

impl ServerResolver {
    pub fn new(services: Vec<Service>, routes: Vec<Route>) -> Self {
        Self {
            services: index_by_machine(services, |s| &s.metadata),
            routes: index_by_machine(routes, |r| &r.metadata),
        }
    }

    /// All servers of `machine`; an external server replaces an internal
    /// one of the same name.
    pub fn resolve(&self, machine: &str) -> Result<BTreeMap<String, ServerConfig>, AnnotationError> {
        let mut servers = BTreeMap::new();
        self.fill_internal_servers(machine, &mut servers)?;
        self.fill_external_servers(machine, &mut servers)?;
        debug!(machine, servers = servers.len(), "Resolved machine servers");
        Ok(servers)
    }

    /// Servers reachable inside the cluster through the machine's Services.
    /// The host is the Service name.
    pub fn fill_internal_servers(
        &self,
        machine: &str,
        servers: &mut BTreeMap<String, ServerConfig>,
    ) -> Result<(), AnnotationError> {
        for service in self.services.get(machine).into_iter().flatten() {
            fill_from(&service.metadata, service.metadata.name.as_deref(), servers)?;
        }
        Ok(())
    }

    /// Servers reachable from outside through the machine's Routes. The host
    /// is the Route's host, left unset when the Route has none; the port is
    /// the one recorded for the server, not the Route's own port.
    pub fn fill_external_servers(
        &self,
        machine: &str,
        servers: &mut BTreeMap<String, ServerConfig>,
    ) -> Result<(), AnnotationError> {
        for route in self.routes.get(machine).into_iter().flatten() {
            fill_from(&route.metadata, route.host(), servers)?;
        }
        Ok(())
    }
}

fn fill_from(
    meta: &ObjectMeta,
    host: Option<&str>,
    servers: &mut BTreeMap<String, ServerConfig>,
) -> Result<(), AnnotationError> {
    let decoded = annotations::new_deserializer(meta.annotations.as_ref()).servers()?;
    for (name, server) in decoded {
        let server = match host {
            Some(host) => server.with_host(host),
            None => server,
        };
        servers.insert(name, server);
    }
    Ok(())
}
