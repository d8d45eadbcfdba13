use std::path::Path;
use std::time::Duration;

use ag_core::frame::{AnimationSource, Image};
use image::codecs::gif::GifDecoder;
use image::codecs::png::PngDecoder;
use image::{AnimationDecoder, Frames, ImageFormat, ImageReader, RgbaImage};

use crate::error::SourceError;
use crate::resize::Resizer;

/// Options de chargement communes aux images fixes et animées.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Downscale frames whose larger side exceeds this many pixels.
    pub max_dimension: Option<u32>,
}

/// Decode the first frame of an image file.
///
/// The format is sniffed from the file content, not its extension.
///
/// # Errors
/// [`SourceError::Io`] if the file cannot be read,
/// [`SourceError::UnsupportedFormat`] if the content is not a known format,
/// [`SourceError::DecodeFailure`] if it is corrupt.
///
/// # Example
/// ```no_run
/// use ag_source::image::{load_image, LoadOptions};
/// use std::path::Path;
/// let img = load_image(Path::new("photo.png"), &LoadOptions::default()).unwrap();
/// ```
pub fn load_image(path: &Path, options: &LoadOptions) -> Result<Image, SourceError> {
    let reader = ImageReader::open(path)?.with_guessed_format()?;
    let Some(format) = reader.format() else {
        return Err(unsupported(path));
    };
    log::debug!("{} : format {format:?}", path.display());
    let rgba = reader.decode()?.to_rgba8();
    let image = to_image(rgba)?;
    shrink(image, options, &mut Resizer::new())
}

/// Decode every frame of an image file with its display duration.
///
/// Animated GIF and APNG yield all their frames; any other format yields a
/// single-frame source with a zero duration.
///
/// # Errors
/// Same as [`load_image`]. An animation without frames is a
/// [`SourceError::DecodeFailure`].
///
/// # Example
/// ```no_run
/// use ag_source::image::{load_animation, LoadOptions};
/// use std::path::Path;
/// let anim = load_animation(Path::new("cat.gif"), &LoadOptions::default()).unwrap();
/// println!("{} frames", anim.len());
/// ```
pub fn load_animation(path: &Path, options: &LoadOptions) -> Result<AnimationSource, SourceError> {
    let reader = ImageReader::open(path)?.with_guessed_format()?;
    let Some(format) = reader.format() else {
        return Err(unsupported(path));
    };

    let frames = match format {
        ImageFormat::Gif => Some(GifDecoder::new(reader.into_inner())?.into_frames()),
        ImageFormat::Png => {
            let mut decoder = PngDecoder::new(reader.into_inner())?;
            if decoder.is_apng()? {
                Some(decoder.apng()?.into_frames())
            } else {
                None
            }
        }
        _ => None,
    };

    let Some(frames) = frames else {
        log::debug!("{} : image fixe ({format:?})", path.display());
        return Ok(AnimationSource::still(load_image(path, options)?));
    };

    let source = collect_frames(frames, options)?;
    if source.is_empty() {
        return Err(SourceError::DecodeFailure(format!(
            "{} : animation sans frame",
            path.display()
        )));
    }
    log::info!(
        "{} : {} frames décodées ({:?})",
        path.display(),
        source.len(),
        format
    );
    Ok(source)
}

fn collect_frames(frames: Frames<'_>, options: &LoadOptions) -> Result<AnimationSource, SourceError> {
    let mut resizer = Resizer::new();
    let mut out = Vec::new();
    for frame in frames {
        let frame = frame?;
        let delay = Duration::from(frame.delay());
        let image = shrink(to_image(frame.into_buffer())?, options, &mut resizer)?;
        out.push((image, delay));
    }
    Ok(AnimationSource { frames: out })
}

fn to_image(rgba: RgbaImage) -> Result<Image, SourceError> {
    let (w, h) = rgba.dimensions();
    Image::from_rgba(w, h, rgba.into_raw()).map_err(|e| SourceError::DecodeFailure(e.to_string()))
}

fn shrink(image: Image, options: &LoadOptions, resizer: &mut Resizer) -> Result<Image, SourceError> {
    match options.max_dimension {
        Some(max) => resizer.fit_within(&image, max),
        None => Ok(image),
    }
}

fn unsupported(path: &Path) -> SourceError {
    SourceError::UnsupportedFormat(format!("{} : contenu non reconnu", path.display()))
}

#[cfg(test)]
mod tests {
    use std::fs::File;

    use image::codecs::gif::{GifEncoder, Repeat};
    use image::{Delay, Frame, Rgba};

    use super::*;

    fn write_gif(path: &Path, count: usize, delay_ms: u32) {
        let file = File::create(path).unwrap();
        let mut encoder = GifEncoder::new(file);
        encoder.set_repeat(Repeat::Infinite).unwrap();
        let frames = (0..count).map(|i| {
            let v = (i * 60) as u8;
            let buf = RgbaImage::from_pixel(6, 4, Rgba([v, v, v, 255]));
            Frame::from_parts(buf, 0, 0, Delay::from_numer_denom_ms(delay_ms, 1))
        });
        encoder.encode_frames(frames).unwrap();
    }

    #[test]
    fn gif_frames_and_delays_are_preserved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("anim.gif");
        write_gif(&path, 3, 100);
        let anim = load_animation(&path, &LoadOptions::default()).unwrap();
        assert_eq!(anim.len(), 3);
        for (img, delay) in &anim.frames {
            assert_eq!((img.width(), img.height()), (6, 4));
            assert_eq!(*delay, Duration::from_millis(100));
        }
    }

    fn write_apng(path: &Path, count: u32, delay_ms: u16) {
        let file = File::create(path).unwrap();
        let mut encoder = png::Encoder::new(std::io::BufWriter::new(file), 6, 4);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_animated(count, 0).unwrap();
        encoder.set_frame_delay(delay_ms, 1000).unwrap();
        let mut writer = encoder.write_header().unwrap();
        for i in 0..count {
            let v = (i * 60) as u8;
            let data: Vec<u8> = [v, v, v, 255].repeat(6 * 4);
            writer.write_image_data(&data).unwrap();
        }
        writer.finish().unwrap();
    }

    #[test]
    fn apng_frames_and_delays_are_preserved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("anim.png");
        write_apng(&path, 3, 80);
        let anim = load_animation(&path, &LoadOptions::default()).unwrap();
        assert_eq!(anim.len(), 3);
        for (i, (img, delay)) in anim.frames.iter().enumerate() {
            let v = (i * 60) as u8;
            assert_eq!((img.width(), img.height()), (6, 4));
            assert_eq!(img.pixel(3, 2), (v, v, v, 255));
            assert_eq!(*delay, Duration::from_millis(80));
        }
    }

    #[test]
    fn format_is_sniffed_not_guessed_from_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("anim.dat");
        write_gif(&path, 2, 50);
        assert_eq!(load_animation(&path, &LoadOptions::default()).unwrap().len(), 2);
    }

    #[test]
    fn still_png_is_single_frame() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("still.png");
        RgbaImage::from_pixel(5, 3, Rgba([10, 20, 30, 255]))
            .save(&path)
            .unwrap();
        let anim = load_animation(&path, &LoadOptions::default()).unwrap();
        assert_eq!(anim.len(), 1);
        assert_eq!(anim.frames[0].0.pixel(4, 2), (10, 20, 30, 255));
        assert_eq!(anim.frames[0].1, Duration::ZERO);
    }

    #[test]
    fn max_dimension_shrinks_frames() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.png");
        RgbaImage::from_pixel(40, 20, Rgba([0, 0, 0, 255]))
            .save(&path)
            .unwrap();
        let options = LoadOptions {
            max_dimension: Some(10),
        };
        let img = load_image(&path, &options).unwrap();
        assert_eq!((img.width(), img.height()), (10, 5));
    }

    #[test]
    fn garbage_is_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"definitely not an image").unwrap();
        assert!(matches!(
            load_image(&path, &LoadOptions::default()),
            Err(SourceError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        assert!(matches!(
            load_animation(Path::new("/nonexistent/x.gif"), &LoadOptions::default()),
            Err(SourceError::Io(_))
        ));
    }
}
