use std::sync::Arc;

use crate::provider::{
    AccuweatherService, NoaaService, ServiceId, WeatherDotComService, WeatherService,
};

/// Known upstream services, in the order they are queried when no subset is requested.
#[derive(Debug, Clone)]
pub struct ServiceRegistry {
    services: Vec<Arc<dyn WeatherService>>,
}

impl Default for ServiceRegistry {
    fn default() -> Self {
        Self::with_services(vec![
            Arc::new(AccuweatherService::new()),
            Arc::new(NoaaService::new()),
            Arc::new(WeatherDotComService::new()),
        ])
    }
}

impl ServiceRegistry {
    pub fn with_services(services: Vec<Arc<dyn WeatherService>>) -> Self {
        Self { services }
    }

    pub fn ids(&self) -> Vec<ServiceId> {
        self.services.iter().map(|service| service.id()).collect()
    }

    /// Look up a service by its wire tag, e.g. `"weather.com"`.
    pub fn get(&self, tag: &str) -> Option<Arc<dyn WeatherService>> {
        let id = ServiceId::try_from(tag).ok()?;
        self.by_id(id)
    }

    pub fn by_id(&self, id: ServiceId) -> Option<Arc<dyn WeatherService>> {
        self.services.iter().find(|service| service.id() == id).cloned()
    }

    /// Services for the requested ids, in request order. An empty request selects every
    /// registered service. Ids without a registered service are skipped.
    pub fn resolve(&self, ids: &[ServiceId]) -> Vec<Arc<dyn WeatherService>> {
        if ids.is_empty() {
            return self.services.clone();
        }
        ids.iter().filter_map(|id| self.by_id(*id)).collect()
    }

    /// Human-readable list of accepted tags: `'a', 'b' or 'c'`.
    pub fn describe_ids(&self) -> String {
        let quoted: Vec<String> =
            self.ids().iter().map(|id| format!("'{}'", id.as_str())).collect();

        match quoted.split_last() {
            None => String::new(),
            Some((last, [])) => last.clone(),
            Some((last, rest)) => format!("{} or {}", rest.join(", "), last),
        }
    }
}
