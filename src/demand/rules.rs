//! Extra coordinates some components need beside their own.

use crate::catalog::CapabilityCatalog;
use crate::coordinate::Coordinate;
use crate::demand::CapabilityKind;
use crate::known::KnownDependencies;

/// Components whose connections are pooled by a companion library.
const BROKER_COMPONENTS: &[&str] = &["jms", "activemq", "amqp", "sjms"];

/// Coordinates to ensure alongside `name`.
///
/// - `rest` routes its endpoints through `direct`
/// - `rest-openapi` needs the OpenAPI support module
/// - `cron` runs on the scheduler module
/// - broker components get the connection pool when its class is known
pub fn companions(
    kind: CapabilityKind,
    name: &str,
    catalog: &CapabilityCatalog,
    known: &KnownDependencies,
    engine_version: &str,
) -> Vec<Coordinate> {
    if kind != CapabilityKind::Component && kind != CapabilityKind::UriFactory {
        return Vec::new();
    }

    let parse = |reference: &str| Coordinate::parse(reference, Some(engine_version));

    let found = match name {
        "rest" => catalog.lookup(CapabilityKind::Component, "direct").map(parse),
        "rest-openapi" => catalog.support("openapi").map(parse),
        "cron" => catalog.support("scheduler").map(parse),
        name if BROKER_COMPONENTS.contains(&name) => catalog
            .support("pooled-connection-class")
            .and_then(|class| known.resolve(class)),
        _ => None,
    };

    found.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::known::VersionProperties;

    fn companions_of(name: &str) -> Vec<String> {
        let catalog = CapabilityCatalog::bundled().unwrap();
        let known = KnownDependencies::bundled(VersionProperties::bundled().unwrap()).unwrap();
        companions(CapabilityKind::Component, name, &catalog, &known, "4.2.0")
            .iter()
            .map(|c| c.gav())
            .collect()
    }

    #[test]
    fn rest_needs_direct() {
        assert_eq!(companions_of("rest"), vec!["dev.conduit:conduit-direct:4.2.0"]);
    }

    #[test]
    fn rest_openapi_needs_openapi_support() {
        assert_eq!(
            companions_of("rest-openapi"),
            vec!["dev.conduit:conduit-openapi-java:4.2.0"]
        );
    }

    #[test]
    fn cron_needs_scheduler() {
        assert_eq!(companions_of("cron"), vec!["dev.conduit:conduit-quartz:4.2.0"]);
    }

    #[test]
    fn brokers_get_connection_pool() {
        for broker in BROKER_COMPONENTS {
            let found = companions_of(broker);
            assert_eq!(found.len(), 1, "{}", broker);
            assert!(found[0].starts_with("org.messaginghub:pooled-jms:"));
        }
    }

    #[test]
    fn broker_without_known_pool_gets_nothing() {
        let catalog = CapabilityCatalog::bundled().unwrap();
        let known = KnownDependencies::default();
        assert!(companions(CapabilityKind::Component, "jms", &catalog, &known, "4.2.0").is_empty());
    }

    #[test]
    fn other_components_and_kinds_have_none() {
        assert!(companions_of("kafka").is_empty());
        let catalog = CapabilityCatalog::bundled().unwrap();
        let known = KnownDependencies::default();
        assert!(companions(CapabilityKind::DataFormat, "rest", &catalog, &known, "4.2.0").is_empty());
    }
}
