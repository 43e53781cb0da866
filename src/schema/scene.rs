/// Scenes and the compiled scene graph.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::event::Event;

/// A named, ordered list of events; the unit of navigation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub name: String,
    pub events: Vec<Event>,
}

impl Scene {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            events: Vec::new(),
        }
    }
}

/// A reference from one scene to a scene name that does not exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingTarget {
    pub scene: String,
    pub kind: &'static str,
    pub target: String,
}

/// Mapping from scene name to scene. Read-only once compiled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScriptGraph {
    scenes: FxHashMap<String, Scene>,
    /// Scene names in the order their headers first appeared.
    order: Vec<String>,
}

impl ScriptGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a scene. A scene with the same name is replaced; it keeps
    /// its first position in `scene_names`.
    pub fn insert(&mut self, scene: Scene) {
        if !self.scenes.contains_key(&scene.name) {
            self.order.push(scene.name.clone());
        }
        self.scenes.insert(scene.name.clone(), scene);
    }

    pub fn get(&self, name: &str) -> Option<&Scene> {
        self.scenes.get(name)
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut Scene> {
        self.scenes.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.scenes.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    pub fn scene_names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Scenes in header order.
    pub fn scenes(&self) -> impl Iterator<Item = &Scene> {
        self.order.iter().filter_map(|name| self.scenes.get(name))
    }

    /// Every jump, choice, or leftover macro that names a missing scene.
    ///
    /// Playback only fails on these when it actually reaches them; this is
    /// for linting ahead of time.
    pub fn dangling_targets(&self) -> Vec<DanglingTarget> {
        let mut dangling = Vec::new();
        for scene in self.scenes() {
            for event in &scene.events {
                let (kind, target) = match event {
                    Event::Jump { target, .. } => ("jump", target),
                    Event::Choice { target, .. } => ("choice", target),
                    Event::Macro { name } => ("macro", name),
                    _ => continue,
                };
                if !self.contains(target) {
                    dangling.push(DanglingTarget {
                        scene: scene.name.clone(),
                        kind,
                        target: target.clone(),
                    });
                }
            }
        }
        dangling
    }

    /// Pretty RON dump of the graph, for debugging compiled scripts.
    pub fn to_ron(&self) -> Result<String, ron::Error> {
        let scenes: Vec<&Scene> = self.scenes().collect();
        ron::ser::to_string_pretty(&scenes, ron::ser::PrettyConfig::default())
    }
}
