//! Patch registry and installation boundary
//!
//! `install_all` runs every registered patch against the host image, gated
//! by config and host version. Failures are contained here: a patch that
//! cannot resolve its targets is reported and skipped, the host keeps its
//! original behavior for that method, and the remaining patches still
//! install.

use rustc_hash::FxHashMap;
use semver::Version;
use splint_bytecode::{Instruction, MethodToken};
use splint_metadata::Image;

use crate::config::PatchConfig;
use crate::error::PatchError;
use crate::patch::{Patch, PatchContext, Transpiler};

/// Per-patch installation outcome
#[derive(Debug)]
pub enum InstallOutcome {
    /// The patch resolved its targets and staged its transpilers
    Installed {
        /// Number of transpilers the patch staged
        transpilers: usize,
    },
    /// Disabled in the user configuration
    Disabled,
    /// The host predates the patch's minimum version
    HostTooOld {
        /// The version the patch requires
        required: Version,
    },
    /// Target resolution failed; nothing was installed for this patch
    Failed(PatchError),
}

/// Report of one `install_all` run
#[derive(Debug, Default)]
pub struct InstallReport {
    outcomes: Vec<(&'static str, InstallOutcome)>,
}

impl InstallReport {
    /// Iterate patch names with their outcomes
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &InstallOutcome)> {
        self.outcomes.iter().map(|(name, outcome)| (*name, outcome))
    }

    /// Look up the outcome for a named patch
    pub fn outcome(&self, name: &str) -> Option<&InstallOutcome> {
        self.outcomes
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, o)| o)
    }

    /// Number of patches that installed
    pub fn installed_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, InstallOutcome::Installed { .. }))
            .count()
    }
}

/// Transpilers accepted at the installation boundary, grouped by method
#[derive(Default)]
pub struct TranspilerSet {
    by_method: FxHashMap<MethodToken, Vec<Transpiler>>,
}

impl TranspilerSet {
    fn accept(&mut self, staged: Vec<(MethodToken, Transpiler)>) {
        for (method, transpiler) in staged {
            self.by_method.entry(method).or_default().push(transpiler);
        }
    }

    /// Run a method's original instruction sequence through its transpilers
    ///
    /// Methods with no transpilers come back unchanged. The host calls this
    /// once per method, at body finalization.
    pub fn finalize(&self, method: MethodToken, code: Vec<Instruction>) -> Vec<Instruction> {
        match self.by_method.get(&method) {
            Some(chain) => chain.iter().fold(code, |code, transpiler| transpiler(code)),
            None => code,
        }
    }

    /// Whether any transpiler targets the method
    pub fn targets(&self, method: MethodToken) -> bool {
        self.by_method.contains_key(&method)
    }

    /// Iterate the methods with installed transpilers
    pub fn methods(&self) -> impl Iterator<Item = MethodToken> + '_ {
        self.by_method.keys().copied()
    }

    /// Number of methods with installed transpilers
    pub fn method_count(&self) -> usize {
        self.by_method.len()
    }
}

/// Registry of patches to install against a host
#[derive(Default)]
pub struct PatchRegistry {
    patches: Vec<Box<dyn Patch>>,
}

impl PatchRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a patch
    pub fn register<P: Patch + 'static>(&mut self, patch: P) {
        self.patches.push(Box::new(patch));
    }

    /// Number of registered patches
    pub fn len(&self) -> usize {
        self.patches.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }

    /// Install every registered patch
    ///
    /// Returns the accepted transpilers and a per-patch report. Never
    /// panics and never propagates a `PatchError`.
    pub fn install_all(
        &self,
        image: &Image,
        host_version: &Version,
        config: &PatchConfig,
    ) -> (TranspilerSet, InstallReport) {
        let mut set = TranspilerSet::default();
        let mut report = InstallReport::default();

        for patch in &self.patches {
            let name = patch.name();

            if !config.is_enabled(name) {
                log::info!("patch {name} disabled by config, skipping");
                report.outcomes.push((name, InstallOutcome::Disabled));
                continue;
            }

            let required = patch.min_host_version();
            if *host_version < required {
                log::info!(
                    "patch {name} requires host {required}, running {host_version}; skipping"
                );
                report
                    .outcomes
                    .push((name, InstallOutcome::HostTooOld { required }));
                continue;
            }

            let mut ctx = PatchContext::new(image, host_version);
            match patch.apply(&mut ctx) {
                Ok(()) => {
                    let staged = ctx.into_staged();
                    let count = staged.len();
                    set.accept(staged);
                    log::info!("patch {name} installed ({count} transpilers)");
                    report
                        .outcomes
                        .push((name, InstallOutcome::Installed { transpilers: count }));
                }
                Err(err) => {
                    // Staged transpilers are dropped with the context; the
                    // host keeps its unpatched behavior for this routine.
                    log::warn!("patch {name} failed to install: {err}");
                    report.outcomes.push((name, InstallOutcome::Failed(err)));
                }
            }
        }

        (set, report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use splint_bytecode::{Opcode, TypeToken};
    use splint_metadata::ImageBuilder;

    fn method(owner: u32, index: u32) -> MethodToken {
        MethodToken {
            owner: TypeToken(owner),
            index,
        }
    }

    struct NopPatch;

    impl Patch for NopPatch {
        fn name(&self) -> &'static str {
            "nop"
        }

        fn min_host_version(&self) -> Version {
            Version::new(1, 0, 0)
        }

        fn apply(&self, ctx: &mut PatchContext<'_>) -> Result<(), PatchError> {
            ctx.add_transpiler(method(0, 0), |code| code);
            Ok(())
        }
    }

    struct FailingPatch;

    impl Patch for FailingPatch {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn min_host_version(&self) -> Version {
            Version::new(1, 0, 0)
        }

        fn apply(&self, ctx: &mut PatchContext<'_>) -> Result<(), PatchError> {
            // Stage something first to prove failure discards it.
            ctx.add_transpiler(method(9, 9), |code| code);
            Err(PatchError::TypeNotFound {
                name: "Ghost".to_string(),
            })
        }
    }

    struct FuturePatch;

    impl Patch for FuturePatch {
        fn name(&self) -> &'static str {
            "future"
        }

        fn min_host_version(&self) -> Version {
            Version::new(99, 0, 0)
        }

        fn apply(&self, _ctx: &mut PatchContext<'_>) -> Result<(), PatchError> {
            unreachable!("gated patches must never apply")
        }
    }

    fn install(registry: &PatchRegistry, config: &PatchConfig) -> (TranspilerSet, InstallReport) {
        let image = ImageBuilder::new().build();
        registry.install_all(&image, &Version::new(1, 8, 0), config)
    }

    #[test]
    fn test_failure_contained_and_others_install() {
        let mut registry = PatchRegistry::new();
        registry.register(FailingPatch);
        registry.register(NopPatch);

        let (set, report) = install(&registry, &PatchConfig::default());

        assert_eq!(report.installed_count(), 1);
        assert!(matches!(
            report.outcome("failing"),
            Some(InstallOutcome::Failed(PatchError::TypeNotFound { .. }))
        ));
        // The failing patch's staged transpiler was discarded.
        assert!(!set.targets(method(9, 9)));
        assert!(set.targets(method(0, 0)));
    }

    #[test]
    fn test_version_gate_skips_entirely() {
        let mut registry = PatchRegistry::new();
        registry.register(FuturePatch);

        let (set, report) = install(&registry, &PatchConfig::default());

        assert_eq!(set.method_count(), 0);
        assert!(matches!(
            report.outcome("future"),
            Some(InstallOutcome::HostTooOld { .. })
        ));
    }

    #[test]
    fn test_config_gate() {
        let mut registry = PatchRegistry::new();
        registry.register(NopPatch);

        let mut config = PatchConfig::default();
        config.set_enabled("nop", false);
        let (set, report) = install(&registry, &config);

        assert_eq!(set.method_count(), 0);
        assert!(matches!(report.outcome("nop"), Some(InstallOutcome::Disabled)));
    }

    #[test]
    fn test_finalize_without_transpilers_is_identity() {
        let set = TranspilerSet::default();
        let code = vec![splint_bytecode::Instruction::simple(Opcode::ReturnVoid)];
        let out = set.finalize(method(3, 1), code.clone());
        assert_eq!(out, code);
    }
}
