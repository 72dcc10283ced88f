use std::collections::BTreeMap;

use ai_core::WorldMut;

#[cfg(feature = "serde")]
use crate::{BehaviorError, BehaviorSetConfig, CandidateDef, Result};
use crate::{Behavior, BehaviorDef, BehaviorKey, BehaviorKind, NoopBehavior};

/// A definition problem found by [`BehaviorRegistry::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    pub code: &'static str,
    pub context: String,
}

type Factory<W> = Box<dyn Fn() -> Box<dyn Behavior<W>>>;

struct Entry<W>
where
    W: WorldMut + 'static,
{
    def: BehaviorDef,
    factory: Factory<W>,
}

/// Behavior definitions and the factories that instantiate their hooks.
///
/// Runtimes share a registry through `Rc`; tune it before handing it out.
pub struct BehaviorRegistry<W>
where
    W: WorldMut + 'static,
{
    entries: BTreeMap<BehaviorKey, Entry<W>>,
}

impl<W> Default for BehaviorRegistry<W>
where
    W: WorldMut + 'static,
{
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<W> core::fmt::Debug for BehaviorRegistry<W>
where
    W: WorldMut + 'static,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list()
            .entries(self.entries.values().map(|e| &e.def))
            .finish()
    }
}

impl<W> BehaviorRegistry<W>
where
    W: WorldMut + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a definition. Returns the previous definition for the key.
    pub fn register<F>(&mut self, def: BehaviorDef, factory: F) -> Option<BehaviorDef>
    where
        F: Fn() -> Box<dyn Behavior<W>> + 'static,
    {
        let key = def.key;
        self.entries
            .insert(
                key,
                Entry {
                    def,
                    factory: Box::new(factory),
                },
            )
            .map(|old| old.def)
    }

    /// Register a definition whose instances have no hooks (pure selectors, markers).
    pub fn register_def(&mut self, def: BehaviorDef) -> Option<BehaviorDef> {
        self.register(def, || Box::new(NoopBehavior))
    }

    pub fn get(&self, key: BehaviorKey) -> Option<&BehaviorDef> {
        self.entries.get(&key).map(|e| &e.def)
    }

    pub fn contains(&self, key: BehaviorKey) -> bool {
        self.entries.contains_key(&key)
    }

    /// Resolve a key from its name (config files refer to behaviors by name).
    pub fn find(&self, name: &str) -> Option<BehaviorKey> {
        self.entries.keys().copied().find(|k| k.name() == name)
    }

    pub fn keys(&self) -> impl Iterator<Item = BehaviorKey> + '_ {
        self.entries.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn instantiate(&self, key: BehaviorKey) -> Option<Box<dyn Behavior<W>>> {
        self.entries.get(&key).map(|e| (e.factory)())
    }

    /// Report candidate arrays that name unregistered or parallel behaviors.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        for entry in self.entries.values() {
            if entry.def.kind == BehaviorKind::Selector && entry.def.candidates.is_empty() {
                issues.push(issue(
                    "selector.empty",
                    format!("selector `{}` has no candidates", entry.def.key),
                ));
            }
            for candidate in &entry.def.candidates {
                match self.get(candidate.behavior) {
                    None => issues.push(issue(
                        "config.unknown_behavior",
                        format!(
                            "`{}` lists unregistered candidate `{}`",
                            entry.def.key, candidate.behavior
                        ),
                    )),
                    Some(def) if def.kind == BehaviorKind::Parallel => issues.push(issue(
                        "config.invalid_candidate",
                        format!(
                            "`{}` lists parallel behavior `{}` as a candidate",
                            entry.def.key, candidate.behavior
                        ),
                    )),
                    Some(_) => {}
                }
            }
        }
        issues
    }

    /// Apply YAML tuning to already-registered behaviors.
    ///
    /// Nothing is changed unless every override resolves.
    #[cfg(feature = "serde")]
    #[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
    pub fn apply_config(&mut self, config: &BehaviorSetConfig) -> Result<()> {
        let mut updates = Vec::with_capacity(config.behaviors.len());
        for (name, tuning) in &config.behaviors {
            let Some(key) = self.find(name) else {
                tracing::error!(code = "config.unknown_behavior", behavior = %name, "unknown behavior in config");
                return Err(BehaviorError::Config(format!("unknown behavior `{name}`")));
            };

            let mut def = self.entries[&key].def.clone();
            if let Some(kind) = tuning.kind {
                def.kind = kind;
            }
            if let Some(priority) = tuning.priority {
                def.priority = priority;
            }
            if let Some(candidates) = &tuning.candidates {
                def.candidates = candidates
                    .iter()
                    .map(|c| {
                        let behavior = self.find(&c.behavior).filter(|k| {
                            self.get(*k)
                                .is_some_and(|d| d.kind != BehaviorKind::Parallel)
                        });
                        let Some(behavior) = behavior else {
                            tracing::error!(code = "config.invalid_candidate", behavior = %name, candidate = %c.behavior, "invalid candidate in config");
                            return Err(BehaviorError::Config(format!(
                                "`{name}` lists invalid candidate `{}`",
                                c.behavior
                            )));
                        };
                        Ok(CandidateDef {
                            behavior,
                            weight: c.weight,
                            cooldown: c.cooldown,
                            max_per_stage: c.max_per_stage,
                            max_rand_repeat: c.max_rand_repeat,
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
            }
            updates.push((key, def));
        }

        for (key, def) in updates {
            if let Some(entry) = self.entries.get_mut(&key) {
                entry.def = def;
            }
        }
        Ok(())
    }
}

fn issue(code: &'static str, context: String) -> ConfigIssue {
    ConfigIssue { code, context }
}
