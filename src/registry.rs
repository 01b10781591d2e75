use crate::model::Route;
use blake3::Hasher;

/// Ordered table of every route emitted during one run.
///
/// Appends keep emission order and nothing is deduplicated: two declarations
/// producing the same `Controller#action` both stay in the table. Consumers
/// that need lookups build their own index over [`RouteRegistry::all`].
#[derive(Debug, Default, Clone)]
pub struct RouteRegistry {
    routes: Vec<Route>,
}

impl RouteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, route: Route) {
        self.routes.push(route);
    }

    pub fn extend<I: IntoIterator<Item = Route>>(&mut self, routes: I) {
        self.routes.extend(routes);
    }

    pub fn all(&self) -> &[Route] {
        &self.routes
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Route> {
        self.routes.iter()
    }

    pub fn last(&self) -> Option<&Route> {
        self.routes.last()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn reset(&mut self) {
        self.routes.clear();
    }

    /// Hash over the rendered routes in order.
    pub fn digest(&self) -> String {
        let mut hasher = Hasher::new();
        for route in &self.routes {
            hasher.update(route.to_string().as_bytes());
            hasher.update(&[0]);
        }
        hasher.finalize().to_hex().to_string()
    }
}

impl<'a> IntoIterator for &'a RouteRegistry {
    type Item = &'a Route;
    type IntoIter = std::slice::Iter<'a, Route>;

    fn into_iter(self) -> Self::IntoIter {
        self.routes.iter()
    }
}
