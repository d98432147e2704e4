// Fixed component catalog and the subsets drawn from it

use crate::domain::config::{
    CHINA_SHORTCUT_ENABLED, COMP_DNS_ENABLED, COMP_PROXY_ENABLED, COMP_WIFI_ENABLED,
    DIRECT_ACCESS_ENABLED, TCP_SCRAMBLER_ENABLED,
};
use crate::domain::GatewayConfig;
use crate::port::Component;
use std::sync::Arc;
use tracing::info;

/// The six network-service components registered at process start
#[derive(Clone)]
pub struct ComponentSet {
    pub wifi: Arc<dyn Component>,
    pub dns: Arc<dyn Component>,
    pub scrambler: Arc<dyn Component>,
    pub proxy: Arc<dyn Component>,
    pub lan: Arc<dyn Component>,
    pub shortcut: Arc<dyn Component>,
}

impl ComponentSet {
    /// Every component, in registration order
    pub fn all(&self) -> Vec<Arc<dyn Component>> {
        vec![
            self.wifi.clone(),
            self.dns.clone(),
            self.scrambler.clone(),
            self.proxy.clone(),
            self.lan.clone(),
            self.shortcut.clone(),
        ]
    }

    /// The full free-internet bundle, unfiltered
    pub fn free_internet_bundle(&self) -> Vec<Arc<dyn Component>> {
        vec![
            self.dns.clone(),
            self.scrambler.clone(),
            self.proxy.clone(),
            self.shortcut.clone(),
        ]
    }

    /// Components started at boot: wifi (unless disabled) and lan
    pub fn always_on(&self, config: &GatewayConfig) -> Vec<Arc<dyn Component>> {
        if config.is_enabled(COMP_WIFI_ENABLED) {
            vec![self.wifi.clone(), self.lan.clone()]
        } else {
            info!("wifi component disabled by config");
            vec![self.lan.clone()]
        }
    }

    /// Free-internet bundle minus every component whose flag is off.
    ///
    /// Shortcut needs both its own flag and `direct_access_enabled`.
    pub fn connect_subset(&self, config: &GatewayConfig) -> Vec<Arc<dyn Component>> {
        let gates: [(&Arc<dyn Component>, &[&str]); 4] = [
            (&self.dns, &[COMP_DNS_ENABLED]),
            (&self.scrambler, &[TCP_SCRAMBLER_ENABLED]),
            (&self.proxy, &[COMP_PROXY_ENABLED]),
            (&self.shortcut, &[CHINA_SHORTCUT_ENABLED, DIRECT_ACCESS_ENABLED]),
        ];

        gates
            .into_iter()
            .filter(|(component, flags)| {
                match flags.iter().find(|flag| !config.is_enabled(flag)) {
                    Some(flag) => {
                        info!(component = %component.name(), flag = %flag, "component disabled by config");
                        false
                    }
                    None => true,
                }
            })
            .map(|(component, _)| component.clone())
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::port::component::mocks::{Journal, MockComponent};

    /// Catalog of mocks plus typed access to each mock
    pub struct MockCatalog {
        pub set: ComponentSet,
        pub dns: Arc<MockComponent>,
        pub proxy: Arc<MockComponent>,
    }

    pub fn mock_catalog(log: &Journal) -> MockCatalog {
        let dns = Arc::new(MockComponent::new("dns", log.clone()));
        let proxy = Arc::new(MockComponent::new("proxy", log.clone()));
        let set = ComponentSet {
            wifi: Arc::new(MockComponent::new("wifi", log.clone())),
            dns: dns.clone(),
            scrambler: Arc::new(MockComponent::new("scrambler", log.clone())),
            proxy: proxy.clone(),
            lan: Arc::new(MockComponent::new("lan", log.clone())),
            shortcut: Arc::new(MockComponent::new("shortcut", log.clone())),
        };
        MockCatalog { set, dns, proxy }
    }
}
