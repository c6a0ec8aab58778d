/// What the runtime should do after `Gpu::begin_frame` fails.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Surface reconfigured; the next frame should succeed.
    Reconfigured,
    SkipFrame,
    /// Out of memory. Shut down.
    Fatal,
}

pub(super) fn choose_format(
    caps: &wgpu::SurfaceCapabilities,
    prefer_srgb: bool,
) -> Option<wgpu::TextureFormat> {
    let first = *caps.formats.first()?;
    if !prefer_srgb {
        return Some(first);
    }

    Some(
        caps.formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(first),
    )
}

pub(super) fn choose_alpha_mode(
    caps: &wgpu::SurfaceCapabilities,
    preferred: Option<wgpu::CompositeAlphaMode>,
) -> wgpu::CompositeAlphaMode {
    preferred
        .filter(|m| caps.alpha_modes.contains(m))
        .or_else(|| caps.alpha_modes.first().copied())
        .unwrap_or(wgpu::CompositeAlphaMode::Auto)
}
