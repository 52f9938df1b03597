use std::collections::{BTreeMap, BTreeSet};

use crate::device::Device;

use super::params::{Capability, Param, ParamKind};

/// Snapshot of fixed-function pipeline state.
///
/// Setting a parameter of a kind that is already present replaces it; distinct
/// kinds never interact.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderState {
    enabled: BTreeSet<Capability>,
    params: BTreeMap<ParamKind, Param>,
}

impl RenderState {
    /// The GL initial capability set (`MULTISAMPLE`, `DITHER`) and no parameters.
    pub fn new() -> Self {
        Self::empty()
            .with_capability(Capability::Multisample)
            .with_capability(Capability::Dither)
    }

    /// No capabilities, no parameters.
    pub fn empty() -> Self {
        Self {
            enabled: BTreeSet::new(),
            params: BTreeMap::new(),
        }
    }

    /// The GL initial state: [`RenderState::new`] plus every parameter kind
    /// that has a GL initial value.
    ///
    /// Used as the reset source when a state stops setting a parameter.
    pub fn gl_defaults() -> Self {
        let mut state = Self::new();
        for kind in ParamKind::ALL {
            if let Some(p) = kind.gl_default() {
                state.set_param(p);
            }
        }
        state
    }

    // ── building ──────────────────────────────────────────────────────────

    pub fn with_capability(mut self, cap: Capability) -> Self {
        self.enable(cap);
        self
    }

    pub fn with_param(mut self, param: impl Into<Param>) -> Self {
        self.set_param(param);
        self
    }

    /// Returns `true` if the capability was not already enabled.
    pub fn enable(&mut self, cap: Capability) -> bool {
        self.enabled.insert(cap)
    }

    /// Returns `true` if the capability was enabled.
    pub fn disable(&mut self, cap: Capability) -> bool {
        self.enabled.remove(&cap)
    }

    /// Stores `param` in its kind's slot, returning the value it replaced.
    pub fn set_param(&mut self, param: impl Into<Param>) -> Option<Param> {
        let param = param.into();
        self.params.insert(param.kind(), param)
    }

    pub fn remove_param(&mut self, kind: ParamKind) -> Option<Param> {
        self.params.remove(&kind)
    }

    // ── queries ───────────────────────────────────────────────────────────

    #[inline]
    pub fn is_enabled(&self, cap: Capability) -> bool {
        self.enabled.contains(&cap)
    }

    #[inline]
    pub fn param(&self, kind: ParamKind) -> Option<&Param> {
        self.params.get(&kind)
    }

    pub fn capabilities(&self) -> impl Iterator<Item = Capability> + '_ {
        self.enabled.iter().copied()
    }

    pub fn params(&self) -> impl Iterator<Item = &Param> + '_ {
        self.params.values()
    }

    // ── transitions ───────────────────────────────────────────────────────

    /// Computes the calls that move the driver from `self` to `target`.
    ///
    /// Parameters `self` sets and `target` does not are reset from `defaults`;
    /// a kind `defaults` does not set is left alone and reported in
    /// [`StateDiff::unresettable`].
    pub fn diff(&self, target: &RenderState, defaults: &RenderState) -> StateDiff {
        let disable = self.enabled.difference(&target.enabled).copied().collect();
        let enable = target.enabled.difference(&self.enabled).copied().collect();
        let reapply = target.params.values().copied().collect();

        let mut reset = Vec::new();
        let mut unresettable = Vec::new();
        for kind in self.params.keys().filter(|k| !target.params.contains_key(*k)) {
            match defaults.param(*kind) {
                Some(p) => reset.push(*p),
                None => unresettable.push(*kind),
            }
        }

        StateDiff {
            disable,
            enable,
            reapply,
            reset,
            unresettable,
        }
    }

    /// Applies the transition from `self` (the active state) to `target`.
    pub fn apply_diff(&self, target: &RenderState, defaults: &RenderState, device: &dyn Device) {
        self.diff(target, defaults).apply(device);
    }

    /// Applies this state as if the driver held nothing: enables every
    /// capability and applies every parameter.
    pub fn apply_all(&self, device: &dyn Device) {
        for cap in &self.enabled {
            device.enable(*cap);
        }
        for p in self.params.values() {
            device.set_param(p);
        }
    }
}

impl Default for RenderState {
    fn default() -> Self {
        Self::new()
    }
}

/// The driver calls of one state transition, in application order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StateDiff {
    pub disable: Vec<Capability>,
    pub enable: Vec<Capability>,
    /// Every parameter of the target state.
    pub reapply: Vec<Param>,
    /// Default values for parameters the target no longer sets.
    pub reset: Vec<Param>,
    /// Kinds the target dropped that have no default to reset to.
    pub unresettable: Vec<ParamKind>,
}

impl StateDiff {
    pub fn is_empty(&self) -> bool {
        self.disable.is_empty()
            && self.enable.is_empty()
            && self.reapply.is_empty()
            && self.reset.is_empty()
    }

    pub fn apply(&self, device: &dyn Device) {
        log::trace!(
            "state diff: -{} +{} caps, {} params, {} resets",
            self.disable.len(),
            self.enable.len(),
            self.reapply.len(),
            self.reset.len()
        );

        for cap in &self.disable {
            device.disable(*cap);
        }
        for cap in &self.enable {
            device.enable(*cap);
        }
        for p in &self.reapply {
            device.set_param(p);
        }
        for p in &self.reset {
            device.set_param(p);
        }
        for kind in &self.unresettable {
            log::trace!("{kind:?} dropped without a default; driver value kept");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{Call, RecordingDevice};
    use crate::state::{CompareFunc, CullFace, DepthFunction, Face, ScissorBox};

    fn state(caps: &[Capability]) -> RenderState {
        caps.iter().fold(RenderState::empty(), |s, c| s.with_capability(*c))
    }

    // ── construction ──────────────────────────────────────────────────────

    #[test]
    fn new_has_gl_initial_capabilities() {
        let s = RenderState::new();
        assert!(s.is_enabled(Capability::Multisample));
        assert!(s.is_enabled(Capability::Dither));
        assert_eq!(s.capabilities().count(), 2);
        assert_eq!(s.params().count(), 0);
    }

    #[test]
    fn set_param_is_last_write_wins() {
        let mut s = RenderState::empty();
        assert!(s.set_param(DepthFunction(CompareFunc::Less)).is_none());
        let prev = s.set_param(DepthFunction(CompareFunc::Greater));
        assert_eq!(prev, Some(DepthFunction(CompareFunc::Less).into()));
        assert_eq!(
            s.param(ParamKind::DepthFunction),
            Some(&DepthFunction(CompareFunc::Greater).into())
        );
        assert_eq!(s.params().count(), 1);
    }

    // ── diff ──────────────────────────────────────────────────────────────

    #[test]
    fn disjoint_capabilities_toggle_once_each() {
        let a = state(&[Capability::DepthTest]);
        let b = state(&[Capability::Blend]);
        let device = RecordingDevice::new();

        a.apply_diff(&b, &RenderState::gl_defaults(), &device);

        assert_eq!(
            device.calls(),
            vec![
                Call::Disable(Capability::DepthTest),
                Call::Enable(Capability::Blend),
            ]
        );
    }

    #[test]
    fn shared_capabilities_are_untouched() {
        let a = state(&[Capability::Dither, Capability::DepthTest]);
        let b = state(&[Capability::Dither, Capability::DepthTest]);
        let diff = a.diff(&b, &RenderState::gl_defaults());
        assert!(diff.is_empty());
    }

    #[test]
    fn overlapping_param_takes_target_value() {
        let a = RenderState::empty().with_param(DepthFunction(CompareFunc::Less));
        let b = RenderState::empty().with_param(DepthFunction(CompareFunc::Greater));
        let device = RecordingDevice::new();

        a.apply_diff(&b, &RenderState::gl_defaults(), &device);

        assert_eq!(
            device.calls(),
            vec![Call::SetParam(DepthFunction(CompareFunc::Greater).into())]
        );
    }

    #[test]
    fn removed_param_resets_to_default() {
        let a = RenderState::empty().with_param(CullFace(Face::Front));
        let b = RenderState::empty();
        let device = RecordingDevice::new();

        a.apply_diff(&b, &RenderState::gl_defaults(), &device);

        assert_eq!(device.calls(), vec![Call::SetParam(CullFace(Face::Back).into())]);
    }

    #[test]
    fn removed_param_without_default_is_left_alone() {
        let a = RenderState::empty().with_param(ScissorBox { x: 0, y: 0, width: 8, height: 8 });
        let b = RenderState::empty();
        let diff = a.diff(&b, &RenderState::gl_defaults());

        assert!(diff.reset.is_empty());
        assert_eq!(diff.unresettable, vec![ParamKind::ScissorBox]);

        let device = RecordingDevice::new();
        diff.apply(&device);
        assert!(device.calls().is_empty());
    }

    #[test]
    fn diff_applies_in_disable_enable_reapply_reset_order() {
        let a = state(&[Capability::CullFace]).with_param(CullFace(Face::Front));
        let b = state(&[Capability::DepthTest]).with_param(DepthFunction(CompareFunc::LessEqual));
        let device = RecordingDevice::new();

        a.apply_diff(&b, &RenderState::gl_defaults(), &device);

        assert_eq!(
            device.calls(),
            vec![
                Call::Disable(Capability::CullFace),
                Call::Enable(Capability::DepthTest),
                Call::SetParam(DepthFunction(CompareFunc::LessEqual).into()),
                Call::SetParam(CullFace(Face::Back).into()),
            ]
        );
    }

    #[test]
    fn apply_all_enables_and_sets_everything() {
        let s = RenderState::new().with_param(DepthFunction(CompareFunc::Always));
        let device = RecordingDevice::new();
        s.apply_all(&device);

        let calls = device.calls();
        assert!(calls.contains(&Call::Enable(Capability::Multisample)));
        assert!(calls.contains(&Call::Enable(Capability::Dither)));
        assert!(calls.contains(&Call::SetParam(DepthFunction(CompareFunc::Always).into())));
        assert_eq!(calls.len(), 3);
    }
}
