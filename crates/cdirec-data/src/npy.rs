//! `.npy` reading for any numeric dtype

use ndarray::ArrayD;
use ndarray_npy::{ReadNpyError, ReadNpyExt};
use std::io::Cursor;
use std::path::Path;

/// Read an `.npy` file and convert its elements to `f32`.
pub(crate) fn read_npy(path: &Path) -> Result<ArrayD<f32>, String> {
    let bytes = std::fs::read(path).map_err(|e| e.to_string())?;

    macro_rules! try_dtype {
        ($($ty:ty),+) => {
            $(
                match ArrayD::<$ty>::read_npy(Cursor::new(&bytes)) {
                    Ok(array) => return Ok(array.mapv(|v| v as f32)),
                    Err(ReadNpyError::WrongDescriptor(_)) => {}
                    Err(e) => return Err(e.to_string()),
                }
            )+
        };
    }

    try_dtype!(f32, f64, i64, i32, i16, i8, u64, u32, u16, u8);

    Err("unsupported npy dtype; expected a numeric array".to_string())
}
