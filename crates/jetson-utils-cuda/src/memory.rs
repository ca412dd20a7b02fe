//! Device and mapped memory allocations.
//!
//! On the target boards device memory and host memory are the same physical
//! DRAM, and mapped (zero-copy) allocations are visible to both sides. The
//! allocations here are therefore plain host buffers; `mapped` records which
//! kind the script asked for.

use jetson_utils_core::{CallArgs, NativeError, NativeObject, NativeType, Value};

use crate::image::{CudaImage, IMAGE_TYPE, ImageFormat};

/// Registered type name of device allocations.
pub const MEMORY_TYPE: &str = "cudaMemory";

/// A device or mapped allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CudaMemory {
    data: Vec<u8>,
    mapped: bool,
}

impl NativeType for CudaMemory {
    const TYPE_NAME: &'static str = MEMORY_TYPE;
}

impl CudaMemory {
    /// Allocate `size` zeroed bytes.
    pub fn alloc(size: usize, mapped: bool) -> Result<Self, NativeError> {
        if size == 0 {
            return Err(NativeError::invalid("allocation size must be greater than zero"));
        }
        let mut data = Vec::new();
        data.try_reserve_exact(size)
            .map_err(|_| NativeError::Cuda(format!("out of memory allocating {size} bytes")))?;
        data.resize(size, 0);
        Ok(Self { data, mapped })
    }

    /// Size in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Whether the allocation is mapped into host address space.
    pub fn is_mapped(&self) -> bool {
        self.mapped
    }

    /// Raw contents.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Raw contents, mutable.
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

/// Run `f` against the memory behind a `cudaMemory` or `cudaImage` object.
pub fn with_memory<R>(
    obj: &NativeObject,
    f: impl FnOnce(&mut CudaMemory) -> R,
) -> Result<R, NativeError> {
    match obj.type_name() {
        MEMORY_TYPE => obj.with(f),
        IMAGE_TYPE => obj.with(|image: &mut CudaImage| f(image.memory_mut())),
        other => Err(NativeError::TypeMismatch {
            expected: "cudaMemory or cudaImage",
            found: other.to_string(),
        }),
    }
}

// =============================================================================
// Entry points
// =============================================================================

/// `cudaMalloc(size)` - allocate device memory.
pub fn cuda_malloc(args: &CallArgs) -> Result<Value, NativeError> {
    let size = args
        .get(0)
        .ok_or_else(|| NativeError::invalid("cudaMalloc() requires a size"))?
        .as_size()?;
    let memory = CudaMemory::alloc(size, false)?;
    tracing::debug!(size, "cudaMalloc");
    Ok(NativeObject::new(memory).into())
}

/// `cudaAllocMapped(size)` or `cudaAllocMapped(width=, height=, format=)`.
///
/// The sized form returns `cudaMemory` and takes the size by position or as
/// `size=`. The image form returns `cudaImage`, takes keywords only, and
/// defaults the format to `rgb8`.
pub fn cuda_alloc_mapped(args: &CallArgs) -> Result<Value, NativeError> {
    const NAME: &str = "cudaAllocMapped";

    match (args.get_keyword("width"), args.get_keyword("height")) {
        (Some(width), Some(height)) => {
            if !args.positional.is_empty() {
                return Err(NativeError::ArgumentCount {
                    function: NAME.into(),
                    expected: "no positional".into(),
                    got: args.len(),
                });
            }
            args.check_keywords(NAME, &["width", "height", "format"])?;

            let format: ImageFormat = match args.get_keyword("format") {
                Some(value) => value.as_str()?.parse()?,
                None => ImageFormat::default(),
            };
            let image = CudaImage::alloc(width.as_size()?, height.as_size()?, format)?;
            tracing::debug!(
                width = image.width(),
                height = image.height(),
                %format,
                "cudaAllocMapped image"
            );
            Ok(NativeObject::new(image).into())
        }
        (None, None) => {
            args.check_keywords(NAME, &["size"])?;
            let size = match (args.len(), args.get_keyword("size")) {
                (1, None) => args.get(0),
                (0, keyword) => keyword,
                (1, Some(_)) => {
                    return Err(NativeError::invalid(
                        "cudaAllocMapped() got size both by position and keyword",
                    ));
                }
                (got, _) => {
                    return Err(NativeError::ArgumentCount {
                        function: NAME.into(),
                        expected: "at most 1".into(),
                        got,
                    });
                }
            };
            let size = size
                .ok_or_else(|| {
                    NativeError::invalid("cudaAllocMapped() requires a size or width/height")
                })?
                .as_size()?;
            let memory = CudaMemory::alloc(size, true)?;
            tracing::debug!(size, "cudaAllocMapped");
            Ok(NativeObject::new(memory).into())
        }
        _ => Err(NativeError::invalid(
            "cudaAllocMapped() requires both width and height",
        )),
    }
}

/// `cudaMemcpy(dst, src)` - copy `src` into `dst`; sizes must match.
pub fn cuda_memcpy(args: &CallArgs) -> Result<Value, NativeError> {
    let (Some(dst), Some(src), 2) = (args.get(0), args.get(1), args.len()) else {
        return Err(NativeError::ArgumentCount {
            function: "cudaMemcpy".into(),
            expected: "exactly 2".into(),
            got: args.len(),
        });
    };
    let (dst, src) = (dst.as_native()?, src.as_native()?);

    // Snapshot the source first so the two locks never overlap.
    let bytes = with_memory(src, |m| m.as_bytes().to_vec())?;
    if dst.ptr_eq(src) {
        return Ok(Value::None);
    }

    with_memory(dst, |m| {
        if m.size() != bytes.len() {
            return Err(NativeError::invalid(format!(
                "cudaMemcpy() size mismatch: dst is {} bytes, src is {} bytes",
                m.size(),
                bytes.len()
            )));
        }
        m.as_bytes_mut().copy_from_slice(&bytes);
        Ok(())
    })??;
    Ok(Value::None)
}

/// `cudaDeviceSynchronize()` - wait for outstanding device work.
///
/// There is no asynchronous work to wait for with host-backed memory.
pub fn cuda_device_synchronize(_args: &CallArgs) -> Result<Value, NativeError> {
    Ok(Value::None)
}

/// `cudaMemory.size(self)`
pub fn memory_size(args: &CallArgs) -> Result<Value, NativeError> {
    let obj = args
        .get(0)
        .ok_or_else(|| NativeError::invalid("missing self"))?
        .as_native()?;
    Value::from_size(with_memory(obj, |m| m.size())?)
}

/// `cudaMemory.mapped(self)`
pub fn memory_mapped(args: &CallArgs) -> Result<Value, NativeError> {
    let obj = args
        .get(0)
        .ok_or_else(|| NativeError::invalid("missing self"))?
        .as_native()?;
    Ok(Value::Bool(with_memory(obj, |m| m.is_mapped())?))
}
