//! `.tif`/`.tiff` reading
//!
//! A single page yields a 2-D `(rows, cols)` array; a multi-page file yields
//! a 3-D `(pages, rows, cols)` stack. All pages must share dimensions.

use ndarray::{ArrayD, IxDyn};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tiff::decoder::{Decoder, DecodingResult, Limits};

pub(crate) fn read_tiff(path: &Path) -> Result<ArrayD<f32>, String> {
    let file = File::open(path).map_err(|e| e.to_string())?;
    let mut decoder = Decoder::new(BufReader::new(file))
        .map_err(|e| e.to_string())?
        .with_limits(Limits::unlimited());

    let mut pages: Vec<Vec<f32>> = Vec::new();
    let mut page_dims: Option<(u32, u32)> = None;

    loop {
        let (width, height) = decoder.dimensions().map_err(|e| e.to_string())?;
        match page_dims {
            None => page_dims = Some((width, height)),
            Some(first) if first != (width, height) => {
                return Err(format!(
                    "page {} is {width}x{height}, expected {}x{}",
                    pages.len(),
                    first.0,
                    first.1
                ));
            }
            Some(_) => {}
        }

        let samples = to_f32(decoder.read_image().map_err(|e| e.to_string())?)?;
        let expected = width as usize * height as usize;
        if samples.len() != expected {
            return Err(format!(
                "page {} holds {} samples, expected {expected}; only single-channel images are supported",
                pages.len(),
                samples.len()
            ));
        }
        pages.push(samples);

        if !decoder.more_images() {
            break;
        }
        decoder.next_image().map_err(|e| e.to_string())?;
    }

    let (width, height) = page_dims.unwrap_or((0, 0));
    let (rows, cols) = (height as usize, width as usize);
    let shape = if pages.len() == 1 {
        vec![rows, cols]
    } else {
        vec![pages.len(), rows, cols]
    };

    ArrayD::from_shape_vec(IxDyn(&shape), pages.concat()).map_err(|e| e.to_string())
}

fn to_f32(result: DecodingResult) -> Result<Vec<f32>, String> {
    let samples = match result {
        DecodingResult::U8(v) => v.into_iter().map(f32::from).collect(),
        DecodingResult::U16(v) => v.into_iter().map(f32::from).collect(),
        DecodingResult::U32(v) => v.into_iter().map(|x| x as f32).collect(),
        DecodingResult::U64(v) => v.into_iter().map(|x| x as f32).collect(),
        DecodingResult::I8(v) => v.into_iter().map(f32::from).collect(),
        DecodingResult::I16(v) => v.into_iter().map(f32::from).collect(),
        DecodingResult::I32(v) => v.into_iter().map(|x| x as f32).collect(),
        DecodingResult::I64(v) => v.into_iter().map(|x| x as f32).collect(),
        DecodingResult::F32(v) => v,
        DecodingResult::F64(v) => v.into_iter().map(|x| x as f32).collect(),
        #[allow(unreachable_patterns)]
        _ => return Err("unsupported tiff sample type".to_string()),
    };
    Ok(samples)
}
