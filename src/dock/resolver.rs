use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use strum::Display;

use crate::common::collections::HashSet;
use crate::model::ComponentName;

/// Apps that never appear in the dock, by package or by exact component.
#[derive(Debug, Clone, Default)]
pub struct Exclusions {
    packages: HashSet<String>,
    components: HashSet<ComponentName>,
}

impl Exclusions {
    pub fn new(
        packages: impl IntoIterator<Item = String>,
        components: impl IntoIterator<Item = ComponentName>,
    ) -> Self {
        Self {
            packages: packages.into_iter().collect(),
            components: components.into_iter().collect(),
        }
    }

    pub fn excludes(&self, component: &ComponentName) -> bool {
        self.packages.contains(component.package()) || self.components.contains(component)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum CandidateSource {
    RecentTask,
    Launcher,
}

/// What the resolver looks at when filling one empty slot.
#[derive(Debug, Clone, Copy)]
pub struct ResolveInput<'a> {
    /// Components of the current user's running tasks, most recent first.
    pub tasks: &'a [ComponentName],
    pub launcher: &'a HashSet<ComponentName>,
    /// Packages already shown in some slot.
    pub placed_packages: &'a HashSet<String>,
    pub exclusions: &'a Exclusions,
}

impl ResolveInput<'_> {
    fn eligible(&self, component: &ComponentName) -> bool {
        !self.exclusions.excludes(component) && !self.placed_packages.contains(component.package())
    }
}

/// Picks the app for an empty slot: the most recent eligible running task,
/// else a random eligible launcher app.
#[derive(Debug)]
pub struct CandidateResolver {
    rng: StdRng,
}

impl CandidateResolver {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    pub fn resolve(&mut self, input: &ResolveInput<'_>) -> Option<ComponentName> {
        self.resolve_with(input, |component, _| Some(component.clone()))
    }

    /// Offers eligible candidates to `accept` in priority order and returns
    /// the first value it produces. A candidate `accept` turns down (for
    /// example because it has no metadata) does not end the search.
    pub fn resolve_with<T>(
        &mut self,
        input: &ResolveInput<'_>,
        mut accept: impl FnMut(&ComponentName, CandidateSource) -> Option<T>,
    ) -> Option<T> {
        let from_tasks = input
            .tasks
            .iter()
            .filter(|c| input.eligible(c))
            .find_map(|c| accept(c, CandidateSource::RecentTask));
        if from_tasks.is_some() {
            return from_tasks;
        }

        // Sorted first so a fixed seed gives a fixed order regardless of how
        // the set happens to be laid out in memory.
        let mut launcher: Vec<&ComponentName> =
            input.launcher.iter().filter(|c| input.eligible(c)).collect();
        launcher.sort();
        launcher.shuffle(&mut self.rng);
        launcher.into_iter().find_map(|c| accept(c, CandidateSource::Launcher))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn c(s: &str) -> ComponentName { s.parse().unwrap() }

    fn set<T: std::hash::Hash + Eq>(items: impl IntoIterator<Item = T>) -> HashSet<T> {
        items.into_iter().collect()
    }

    #[test]
    fn prefers_first_eligible_task() {
        let tasks = [c("com.a/.Main"), c("com.b/.Main"), c("com.c/.Main")];
        let launcher = set([c("com.z/.Main")]);
        let placed = set(["com.a".to_string()]);
        let exclusions = Exclusions::new(["com.b".to_string()], []);
        let input = ResolveInput {
            tasks: &tasks,
            launcher: &launcher,
            placed_packages: &placed,
            exclusions: &exclusions,
        };
        assert_eq!(CandidateResolver::new(Some(1)).resolve(&input), Some(c("com.c/.Main")));
    }

    #[test]
    fn falls_back_to_launcher_when_tasks_are_ineligible() {
        let tasks = [c("com.a/.Main"), c("com.b/.Other")];
        let launcher = set([c("com.a/.Main"), c("com.z/.Main")]);
        let placed = set(["com.a".to_string()]);
        let exclusions = Exclusions::new([], [c("com.b/.Other")]);
        let input = ResolveInput {
            tasks: &tasks,
            launcher: &launcher,
            placed_packages: &placed,
            exclusions: &exclusions,
        };
        assert_eq!(CandidateResolver::new(None).resolve(&input), Some(c("com.z/.Main")));
    }

    #[test]
    fn exhausted_sources_resolve_to_none() {
        let launcher = set([c("com.a/.Main")]);
        let placed = set(["com.a".to_string()]);
        let exclusions = Exclusions::default();
        let input = ResolveInput {
            tasks: &[],
            launcher: &launcher,
            placed_packages: &placed,
            exclusions: &exclusions,
        };
        assert_eq!(CandidateResolver::new(None).resolve(&input), None);
    }

    #[test]
    fn rejected_candidates_do_not_stop_the_search() {
        let tasks = [c("com.a/.Main"), c("com.b/.Main")];
        let launcher = set([c("com.z/.Main")]);
        let placed = HashSet::default();
        let exclusions = Exclusions::default();
        let input = ResolveInput {
            tasks: &tasks,
            launcher: &launcher,
            placed_packages: &placed,
            exclusions: &exclusions,
        };
        let mut offered = Vec::new();
        let found = CandidateResolver::new(None).resolve_with(&input, |component, source| {
            offered.push((component.clone(), source));
            (source == CandidateSource::Launcher).then(|| component.clone())
        });
        assert_eq!(found, Some(c("com.z/.Main")));
        assert_eq!(offered, vec![
            (c("com.a/.Main"), CandidateSource::RecentTask),
            (c("com.b/.Main"), CandidateSource::RecentTask),
            (c("com.z/.Main"), CandidateSource::Launcher),
        ]);
    }

    #[test]
    fn launcher_order_is_stable_for_a_seed() {
        let launcher = set((0..16).map(|i| c(&format!("com.app{i}/.Main"))));
        let placed = HashSet::default();
        let exclusions = Exclusions::default();
        let input = ResolveInput {
            tasks: &[],
            launcher: &launcher,
            placed_packages: &placed,
            exclusions: &exclusions,
        };
        let order = |seed| {
            let mut seen = Vec::new();
            CandidateResolver::new(Some(seed)).resolve_with(&input, |component, _| {
                seen.push(component.clone());
                None::<()>
            });
            seen
        };
        assert_eq!(order(42), order(42));
        assert_eq!(order(42).len(), 16);
    }
}
