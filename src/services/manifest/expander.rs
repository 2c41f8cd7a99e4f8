use super::types::{Manifest, ServiceSpec};

/// 一个待注册/注销的逻辑服务：派生出的服务名及其端口声明
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceTarget<'a> {
    pub name: String,
    pub spec: &'a ServiceSpec,
}

/// 子服务名：`<name>.<hostname>`
pub fn sub_service_name(name: &str, hostname: &str) -> String {
    format!("{name}.{hostname}")
}

/// 展开清单：主机级服务在前，随后按子服务名字典序排列。
/// 注册与注销都走这里，保证两侧得到的名字集合一致。
pub fn expand<'a>(manifest: &'a Manifest, hostname: &str) -> Vec<ServiceTarget<'a>> {
    let mut targets = Vec::with_capacity(manifest.services.len() + 1);
    targets.push(ServiceTarget {
        name: hostname.to_string(),
        spec: &manifest.service,
    });
    targets.extend(manifest.services.iter().map(|(key, spec)| ServiceTarget {
        name: sub_service_name(key, hostname),
        spec,
    }));
    targets
}

pub fn expand_names(manifest: &Manifest, hostname: &str) -> Vec<String> {
    expand(manifest, hostname)
        .into_iter()
        .map(|target| target.name)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::{BTreeMap, HashSet};

    fn sample_manifest() -> Manifest {
        Manifest::new(ServiceSpec::tcp(80))
            .with_service("web", ServiceSpec::tcp(8080))
            .with_service("api", ServiceSpec::new(9090, "udp"))
    }

    #[test]
    fn test_expand_names() {
        let names = expand_names(&sample_manifest(), "abc");
        assert_eq!(names, vec!["abc", "api.abc", "web.abc"]);
    }

    #[test]
    fn test_expand_keeps_specs() {
        let manifest = sample_manifest();
        let targets = expand(&manifest, "abc");

        assert_eq!(targets[0].spec, &manifest.service);
        assert_eq!(targets[1].spec.proto, "udp");
        assert_eq!(targets[2].spec, &ServiceSpec::tcp(8080));
    }

    #[test]
    fn test_host_only_manifest() {
        let names = expand_names(&Manifest::default(), "worker-1");
        assert_eq!(names, vec!["worker-1"]);
    }

    fn arb_manifest() -> impl Strategy<Value = Manifest> {
        (
            0u16..=u16::MAX,
            prop::collection::btree_map("[a-z][a-z0-9-]{0,8}", (0u16..=u16::MAX, "tcp|udp"), 0..8),
        )
            .prop_map(|(port, services)| Manifest {
                service: ServiceSpec::tcp(port),
                services: services
                    .into_iter()
                    .map(|(name, (port, proto))| (name, ServiceSpec::new(port, proto)))
                    .collect::<BTreeMap<_, _>>(),
            })
    }

    proptest! {
        #[test]
        fn prop_expansion_is_symmetric(manifest in arb_manifest(), hostname in "[a-z][a-z0-9-]{0,12}") {
            let on_start: HashSet<_> = expand_names(&manifest, &hostname).into_iter().collect();
            let on_stop: HashSet<_> = expand_names(&manifest.clone(), &hostname).into_iter().collect();
            prop_assert_eq!(on_start, on_stop);
        }

        #[test]
        fn prop_names_are_distinct(manifest in arb_manifest(), hostname in "[a-z][a-z0-9-]{0,12}") {
            let names = expand_names(&manifest, &hostname);
            let unique: HashSet<_> = names.iter().collect();
            prop_assert_eq!(unique.len(), names.len());
            prop_assert_eq!(names.len(), manifest.services.len() + 1);
            prop_assert_eq!(&names[0], &hostname);
        }
    }
}
