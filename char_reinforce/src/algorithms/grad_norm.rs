//! Global gradient-norm measurement and clipping.
//!
//! Burn's `GradientClippingConfig::Norm` clips inside the optimizer and never
//! reports the norm it saw. The update procedure needs that number (for
//! logging and for overflow detection), so the norm is taken here over every
//! parameter gradient of the module and the gradients are rescaled in place.

use std::marker::PhantomData;

use burn::module::{AutodiffModule, ModuleVisitor, ParamId};
use burn::optim::GradientsParams;
use burn::tensor::backend::AutodiffBackend;
use burn::tensor::{ElementConversion, Tensor};

/// Sums squared gradient entries for every parameter of a module.
struct SquaredNormVisitor<'a, B: AutodiffBackend> {
    grads: &'a GradientsParams,
    sum_sq: f64,
    _backend: PhantomData<B>,
}

impl<B: AutodiffBackend> ModuleVisitor<B> for SquaredNormVisitor<'_, B> {
    fn visit_float<const D: usize>(&mut self, id: ParamId, _tensor: &Tensor<B, D>) {
        if let Some(grad) = self.grads.get::<B::InnerBackend, D>(id) {
            let sq: f64 = grad.powf_scalar(2.0).sum().into_scalar().elem();
            self.sum_sq += sq;
        }
    }
}

/// Multiplies every parameter gradient by a constant factor.
struct ScaleVisitor<'a, B: AutodiffBackend> {
    grads: &'a mut GradientsParams,
    factor: f32,
    _backend: PhantomData<B>,
}

impl<B: AutodiffBackend> ModuleVisitor<B> for ScaleVisitor<'_, B> {
    fn visit_float<const D: usize>(&mut self, id: ParamId, _tensor: &Tensor<B, D>) {
        if let Some(grad) = self.grads.remove::<B::InnerBackend, D>(id) {
            self.grads
                .register::<B::InnerBackend, D>(id, grad.mul_scalar(self.factor));
        }
    }
}

/// Outcome of [`clip_grad_norm`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipOutcome {
    /// L2 norm before clipping.
    pub norm: f32,
    /// Whether gradients were rescaled.
    pub clipped: bool,
}

/// L2 norm over all parameter gradients of `module`.
pub fn global_grad_norm<B, M>(module: &M, grads: &GradientsParams) -> f32
where
    B: AutodiffBackend,
    M: AutodiffModule<B>,
{
    let mut visitor = SquaredNormVisitor::<B> {
        grads,
        sum_sq: 0.0,
        _backend: PhantomData,
    };
    module.visit(&mut visitor);
    visitor.sum_sq.sqrt() as f32
}

/// Multiply every parameter gradient of `module` by `factor`.
pub fn scale_grads<B, M>(module: &M, grads: &mut GradientsParams, factor: f32)
where
    B: AutodiffBackend,
    M: AutodiffModule<B>,
{
    let mut visitor = ScaleVisitor::<B> {
        grads,
        factor,
        _backend: PhantomData,
    };
    module.visit(&mut visitor);
}

/// Rescale gradients so their global norm is at most `max_norm`.
///
/// A non-finite norm is reported as-is and left unclipped; callers decide
/// whether to abandon the step.
pub fn clip_grad_norm<B, M>(module: &M, grads: &mut GradientsParams, max_norm: f32) -> ClipOutcome
where
    B: AutodiffBackend,
    M: AutodiffModule<B>,
{
    let norm = global_grad_norm(module, grads);
    if norm.is_finite() && norm > max_norm {
        scale_grads(module, grads, max_norm / norm);
        ClipOutcome {
            norm,
            clipped: true,
        }
    } else {
        ClipOutcome {
            norm,
            clipped: false,
        }
    }
}
