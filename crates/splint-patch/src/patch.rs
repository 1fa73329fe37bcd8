//! Patch trait and installation context
//!
//! A patch resolves its targets against the host image and stages
//! transpilers on the methods it wants rewritten. Staged transpilers only
//! take effect if the patch's `apply` returns `Ok`; a failure anywhere in
//! resolution discards everything the patch staged, so a patch is either
//! fully installed or not installed at all.

use semver::Version;
use splint_bytecode::{Instruction, MethodToken};
use splint_metadata::Image;

use crate::error::PatchError;

/// A method body transformation installed at load time
///
/// Receives the original instruction sequence once, when the host
/// finalizes the method, and returns the replacement sequence.
pub type Transpiler = Box<dyn Fn(Vec<Instruction>) -> Vec<Instruction>>;

/// Installation context handed to a patch's `apply`
pub struct PatchContext<'a> {
    image: &'a Image,
    host_version: &'a Version,
    staged: Vec<(MethodToken, Transpiler)>,
}

impl<'a> PatchContext<'a> {
    pub(crate) fn new(image: &'a Image, host_version: &'a Version) -> Self {
        Self {
            image,
            host_version,
            staged: Vec::new(),
        }
    }

    /// The host metadata image
    pub fn image(&self) -> &'a Image {
        self.image
    }

    /// The running host's version
    pub fn host_version(&self) -> &Version {
        self.host_version
    }

    /// Stage a transpiler on a method
    pub fn add_transpiler<F>(&mut self, method: MethodToken, transpiler: F)
    where
        F: Fn(Vec<Instruction>) -> Vec<Instruction> + 'static,
    {
        self.staged.push((method, Box::new(transpiler)));
    }

    pub(crate) fn into_staged(self) -> Vec<(MethodToken, Transpiler)> {
        self.staged
    }
}

/// A load-time patch against the host
pub trait Patch {
    /// Stable name, used for config gating and diagnostics
    fn name(&self) -> &'static str;

    /// Minimum host version this patch understands
    ///
    /// Installation is skipped entirely on older hosts.
    fn min_host_version(&self) -> Version;

    /// Resolve targets and stage transpilers
    ///
    /// Must not leave partial state behind on failure; the registry
    /// discards staged transpilers when this returns an error.
    fn apply(&self, ctx: &mut PatchContext<'_>) -> Result<(), PatchError>;
}
