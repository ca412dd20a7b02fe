//! CUDA contributing subsystem for the jetson-utils extension module.
//!
//! Supplies the `cuda*` memory utilities and the `cudaMemory` / `cudaImage`
//! types. The registry reaches this crate only through [`CudaSubsystem`]'s
//! [`Contributor`] implementation:
//!
//! - [`register_functions`] - the sentinel-terminated descriptor table
//! - [`register_types`] - attaches the native types to a module object

pub mod image;
pub mod memory;

use jetson_utils_core::{CallFlags, Descriptor, ModuleObject, TypeObject};
use jetson_utils_registry::Contributor;

pub use image::{CudaImage, IMAGE_TYPE, ImageFormat};
pub use memory::{CudaMemory, MEMORY_TYPE, with_memory};

// =============================================================================
// DESCRIPTOR TABLES
// =============================================================================

static FUNCTIONS: [Descriptor; 5] = [
    Descriptor::new("cudaMalloc", memory::cuda_malloc, CallFlags::O)
        .with_doc("Allocate CUDA device memory.\n\ncudaMalloc(size) -> cudaMemory"),
    Descriptor::new(
        "cudaAllocMapped",
        memory::cuda_alloc_mapped,
        CallFlags::VARARGS.union(CallFlags::KEYWORDS),
    )
    .with_doc(
        "Allocate mapped (zero-copy) memory or an image.\n\n\
         cudaAllocMapped(size) -> cudaMemory\n\
         cudaAllocMapped(width=, height=, format='rgb8') -> cudaImage",
    ),
    Descriptor::new("cudaMemcpy", memory::cuda_memcpy, CallFlags::VARARGS)
        .with_doc("Copy src into dst. Both must be the same size.\n\ncudaMemcpy(dst, src)"),
    Descriptor::new(
        "cudaDeviceSynchronize",
        memory::cuda_device_synchronize,
        CallFlags::NOARGS,
    )
    .with_doc("Wait for the GPU to finish all outstanding work."),
    Descriptor::SENTINEL,
];

static MEMORY_METHODS: [Descriptor; 3] = [
    Descriptor::new("size", memory::memory_size, CallFlags::O).with_doc("Size in bytes."),
    Descriptor::new("mapped", memory::memory_mapped, CallFlags::O)
        .with_doc("True for zero-copy allocations."),
    Descriptor::SENTINEL,
];

static IMAGE_METHODS: [Descriptor; 6] = [
    Descriptor::new("size", memory::memory_size, CallFlags::O).with_doc("Size in bytes."),
    Descriptor::new("mapped", memory::memory_mapped, CallFlags::O)
        .with_doc("True for zero-copy allocations."),
    Descriptor::new("width", image::image_width, CallFlags::O).with_doc("Width in pixels."),
    Descriptor::new("height", image::image_height, CallFlags::O).with_doc("Height in pixels."),
    Descriptor::new("format", image::image_format, CallFlags::O).with_doc("Pixel format name."),
    Descriptor::SENTINEL,
];

static TYPES: [TypeObject; 2] = [
    TypeObject::new(MEMORY_TYPE)
        .with_doc("CUDA memory allocation")
        .with_methods(&MEMORY_METHODS),
    TypeObject::new(IMAGE_TYPE)
        .with_doc("CUDA image in mapped memory")
        .with_methods(&IMAGE_METHODS),
];

/// The subsystem's descriptor table.
pub fn register_functions() -> &'static [Descriptor] {
    &FUNCTIONS
}

/// Attach `cudaMemory` and `cudaImage` to `module`.
///
/// Every type is attempted; returns `false` if any of them failed.
pub fn register_types(module: &mut dyn ModuleObject) -> bool {
    let mut ok = true;
    for ty in &TYPES {
        if let Err(err) = module.add_type(*ty) {
            tracing::warn!(
                module = module.name(),
                type_name = ty.name,
                %err,
                "failed to attach type"
            );
            ok = false;
        }
    }
    ok
}

/// Registry-facing handle for this subsystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct CudaSubsystem;

impl Contributor for CudaSubsystem {
    fn name(&self) -> &str {
        "CUDA"
    }

    fn functions(&self) -> Option<&'static [Descriptor]> {
        Some(register_functions())
    }

    fn register_types(&self, module: &mut dyn ModuleObject) -> bool {
        register_types(module)
    }
}
