//! wgpu device and window surface.
//!
//! - `Gpu` owns instance, adapter, device, queue and the configured surface
//! - `GpuFrame` is one acquired swapchain image plus its encoder
//! - surface errors map to a `SurfaceErrorAction` the runtime acts on

mod gpu;
mod init;
mod surface;

pub use gpu::{Gpu, GpuFrame};
pub use init::GpuInit;
pub use surface::SurfaceErrorAction;
