use std::collections::HashSet;

/// Title used when none is requested.
pub const DEFAULT_TITLE: &str = "Undefined";

/// Hands out display titles that do not collide with titles already in use.
pub trait TitleRegistry {
    fn unique_name(&mut self, requested: Option<&str>) -> String;
}

/// In-memory registry: a taken title gets a `-1`, `-2`, ... suffix.
#[derive(Debug, Default, Clone)]
pub struct NameRegistry {
    taken: HashSet<String>,
}

impl NameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.taken.contains(name)
    }

    /// Frees a title so it can be handed out again.
    pub fn release(&mut self, name: &str) -> bool {
        self.taken.remove(name)
    }
}

impl TitleRegistry for NameRegistry {
    fn unique_name(&mut self, requested: Option<&str>) -> String {
        let base = requested.unwrap_or(DEFAULT_TITLE);
        let name = if self.taken.contains(base) {
            (1..)
                .map(|i| format!("{base}-{i}"))
                .find(|candidate| !self.taken.contains(candidate))
                .unwrap_or_else(|| base.to_string())
        } else {
            base.to_string()
        };
        self.taken.insert(name.clone());
        name
    }
}
