//! Sequential dependency orchestrator
//!
//! Walks the declared recipes in order against one toolchain, building
//! only the ones whose installed marker is stale. Later recipes' configure
//! steps probe for earlier installs through the sysroot, so order matters
//! and nothing runs in parallel.

use crossforge_toolchain::Toolchain;
use tracing::info;

use crate::recipe::Recipe;
use crate::BuildError;

/// Capability every orchestratable dependency exposes
#[allow(async_fn_in_trait)]
pub trait Buildable {
    fn name(&self) -> &str;

    async fn is_installed(
        &self,
        client: &reqwest::Client,
        toolchain: &Toolchain,
    ) -> Result<bool, BuildError>;

    async fn build(
        &self,
        client: &reqwest::Client,
        toolchain: &Toolchain,
        jobs: u32,
    ) -> Result<(), BuildError>;
}

impl Buildable for Recipe {
    fn name(&self) -> &str {
        Recipe::name(self)
    }

    async fn is_installed(
        &self,
        client: &reqwest::Client,
        toolchain: &Toolchain,
    ) -> Result<bool, BuildError> {
        Recipe::is_installed(self, client, toolchain).await
    }

    async fn build(
        &self,
        client: &reqwest::Client,
        toolchain: &Toolchain,
        jobs: u32,
    ) -> Result<(), BuildError> {
        Recipe::build(self, client, toolchain, jobs).await
    }
}

/// What happened to one recipe during a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Built,
    UpToDate,
}

/// Runs declared recipes in order against one immutable toolchain
pub struct Orchestrator {
    client: reqwest::Client,
    jobs: u32,
}

impl Orchestrator {
    pub fn new(jobs: u32) -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self { client, jobs }
    }

    /// The shared download client
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Process every recipe in declaration order: skip the fresh ones,
    /// build the rest. The first failure aborts the run; partially built
    /// output is left for the next run's freshness check to re-evaluate.
    pub async fn run<B: Buildable>(
        &self,
        recipes: &[B],
        toolchain: &Toolchain,
    ) -> Result<Vec<(String, Outcome)>, BuildError> {
        let mut outcomes = Vec::with_capacity(recipes.len());

        for recipe in recipes {
            if recipe.is_installed(&self.client, toolchain).await? {
                info!("{} is up to date", recipe.name());
                outcomes.push((recipe.name().to_string(), Outcome::UpToDate));
                continue;
            }

            recipe.build(&self.client, toolchain, self.jobs).await?;
            outcomes.push((recipe.name().to_string(), Outcome::Built));
        }

        Ok(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil;
    use std::sync::{Arc, Mutex};

    struct FakeRecipe {
        name: String,
        installed: bool,
        fail: bool,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl FakeRecipe {
        fn new(name: &str, installed: bool, log: &Arc<Mutex<Vec<String>>>) -> Self {
            Self {
                name: name.to_string(),
                installed,
                fail: false,
                log: Arc::clone(log),
            }
        }
    }

    impl Buildable for FakeRecipe {
        fn name(&self) -> &str {
            &self.name
        }

        async fn is_installed(
            &self,
            _client: &reqwest::Client,
            _toolchain: &Toolchain,
        ) -> Result<bool, BuildError> {
            Ok(self.installed)
        }

        async fn build(
            &self,
            _client: &reqwest::Client,
            _toolchain: &Toolchain,
            _jobs: u32,
        ) -> Result<(), BuildError> {
            if self.fail {
                return Err(BuildError::BuildFailed(format!("{} broke", self.name)));
            }
            self.log.lock().unwrap().push(self.name.clone());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_builds_only_stale_recipes_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let tc = testutil::toolchain(dir.path());
        let log = Arc::new(Mutex::new(Vec::new()));

        let recipes = vec![
            FakeRecipe::new("a", false, &log),
            FakeRecipe::new("b", true, &log),
            FakeRecipe::new("c", false, &log),
        ];

        let outcomes = Orchestrator::new(4).run(&recipes, &tc).await.unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["a", "c"]);
        assert_eq!(
            outcomes,
            vec![
                ("a".to_string(), Outcome::Built),
                ("b".to_string(), Outcome::UpToDate),
                ("c".to_string(), Outcome::Built),
            ]
        );
    }

    #[tokio::test]
    async fn test_first_failure_aborts_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let tc = testutil::toolchain(dir.path());
        let log = Arc::new(Mutex::new(Vec::new()));

        let mut broken = FakeRecipe::new("b", false, &log);
        broken.fail = true;
        let recipes = vec![
            FakeRecipe::new("a", false, &log),
            broken,
            FakeRecipe::new("c", false, &log),
        ];

        let result = Orchestrator::new(4).run(&recipes, &tc).await;

        assert!(matches!(result, Err(BuildError::BuildFailed(_))));
        // c was never reached
        assert_eq!(*log.lock().unwrap(), vec!["a"]);
    }
}
