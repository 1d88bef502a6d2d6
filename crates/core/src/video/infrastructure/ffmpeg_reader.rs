use std::path::Path;

use ffmpeg_next::format::context::Input;
use ffmpeg_next::software::scaling;

use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_reader::VideoReader;

type BoxError = Box<dyn std::error::Error>;

/// Pulls frames out of a video file with ffmpeg-next, converted to RGB24.
pub struct FfmpegReader {
    input_ctx: Option<Input>,
    video_stream_index: usize,
}

// Safety: FfmpegReader is only used from a single thread at a time.
// The raw pointers inside ffmpeg types are not shared across threads.
unsafe impl Send for FfmpegReader {}

impl FfmpegReader {
    pub fn new() -> Self {
        Self {
            input_ctx: None,
            video_stream_index: 0,
        }
    }
}

impl Default for FfmpegReader {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoReader for FfmpegReader {
    fn open(&mut self, path: &Path) -> Result<VideoMetadata, BoxError> {
        ffmpeg_next::init()?;
        let ictx = ffmpeg_next::format::input(path)?;

        let stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or("No video stream found")?;
        let decoder = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())?
            .decoder()
            .video()?;

        let rate = stream.rate();
        let fps = if rate.denominator() != 0 {
            rate.numerator() as f64 / rate.denominator() as f64
        } else {
            0.0
        };

        let metadata = VideoMetadata {
            width: decoder.width(),
            height: decoder.height(),
            fps,
            total_frames: stream.frames().max(0) as usize,
            codec: decoder
                .codec()
                .map(|c| c.name().to_string())
                .unwrap_or_default(),
            source_path: Some(path.to_path_buf()),
        };
        log::debug!(
            "Opened {} ({}x{} @ {:.2} fps, {} frames)",
            path.display(),
            metadata.width,
            metadata.height,
            metadata.fps,
            metadata.total_frames
        );

        self.video_stream_index = stream.index();
        self.input_ctx = Some(ictx);
        Ok(metadata)
    }

    fn frames(&mut self) -> Box<dyn Iterator<Item = Result<Frame, BoxError>> + '_> {
        let Some(ictx) = self.input_ctx.as_mut() else {
            return Box::new(std::iter::once(Err("FfmpegReader: not opened".into())));
        };
        match FrameIter::new(ictx, self.video_stream_index) {
            Ok(iter) => Box::new(iter),
            Err(e) => Box::new(std::iter::once(Err(e))),
        }
    }

    fn close(&mut self) {
        self.input_ctx = None;
    }
}

/// Decodes lazily, one frame per `next()`.
struct FrameIter<'a> {
    ictx: &'a mut Input,
    decoder: ffmpeg_next::decoder::Video,
    scaler: scaling::Context,
    stream_index: usize,
    next_index: usize,
    flushing: bool,
    done: bool,
}

impl<'a> FrameIter<'a> {
    fn new(ictx: &'a mut Input, stream_index: usize) -> Result<Self, BoxError> {
        let stream = ictx.stream(stream_index).ok_or("Video stream disappeared")?;
        let decoder = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())?
            .decoder()
            .video()?;
        let scaler = scaling::Context::get(
            decoder.format(),
            decoder.width(),
            decoder.height(),
            ffmpeg_next::format::Pixel::RGB24,
            decoder.width(),
            decoder.height(),
            scaling::Flags::BILINEAR,
        )?;
        Ok(Self {
            ictx,
            decoder,
            scaler,
            stream_index,
            next_index: 0,
            flushing: false,
            done: false,
        })
    }

    fn try_receive(&mut self) -> Option<Result<Frame, BoxError>> {
        let mut decoded = ffmpeg_next::util::frame::video::Video::empty();
        self.decoder.receive_frame(&mut decoded).ok()?;

        let mut rgb = ffmpeg_next::util::frame::video::Video::empty();
        if let Err(e) = self.scaler.run(&decoded, &mut rgb) {
            return Some(Err(Box::new(e)));
        }
        let (width, height) = (self.decoder.width(), self.decoder.height());
        let frame = Frame::new(packed_rgb(&rgb, width, height), width, height, self.next_index);
        self.next_index += 1;
        Some(Ok(frame))
    }
}

impl Iterator for FrameIter<'_> {
    type Item = Result<Frame, BoxError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if let Some(result) = self.try_receive() {
            return Some(result);
        }
        if self.flushing {
            self.done = true;
            return None;
        }

        loop {
            let Some((stream, packet)) = self.ictx.packets().next() else {
                let _ = self.decoder.send_eof();
                self.flushing = true;
                let result = self.try_receive();
                self.done = result.is_none();
                return result;
            };
            if stream.index() != self.stream_index || self.decoder.send_packet(&packet).is_err() {
                continue;
            }
            if let Some(result) = self.try_receive() {
                return Some(result);
            }
        }
    }
}

/// Strips ffmpeg's per-row padding (stride may exceed `width * 3`).
fn packed_rgb(rgb: &ffmpeg_next::util::frame::video::Video, width: u32, height: u32) -> Vec<u8> {
    let stride = rgb.stride(0);
    let data = rgb.data(0);
    let row_bytes = width as usize * 3;

    let mut pixels = Vec::with_capacity(row_bytes * height as usize);
    for row in 0..height as usize {
        let start = row * stride;
        pixels.extend_from_slice(&data[start..start + row_bytes]);
    }
    pixels
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Encodes `count` flat grey frames to an MPEG-4 file.
    fn write_test_video(path: &Path, count: usize, width: u32, height: u32) {
        use ffmpeg_next::{codec, encoder, format, util::frame::video::Video, Packet, Rational};

        ffmpeg_next::init().unwrap();
        let mut octx = format::output(path).unwrap();
        let global_header = octx.format().flags().contains(format::Flags::GLOBAL_HEADER);
        let mpeg4 = encoder::find(codec::Id::MPEG4).unwrap();
        let mut ost = octx.add_stream(Some(mpeg4)).unwrap();

        let mut ctx = codec::context::Context::new_with_codec(mpeg4)
            .encoder()
            .video()
            .unwrap();
        ctx.set_width(width);
        ctx.set_height(height);
        ctx.set_format(format::Pixel::YUV420P);
        ctx.set_time_base(Rational(1, 25));
        ctx.set_frame_rate(Some(Rational(25, 1)));
        if global_header {
            ctx.set_flags(codec::Flags::GLOBAL_HEADER);
        }
        let mut enc = ctx.open_with(ffmpeg_next::Dictionary::new()).unwrap();
        ost.set_parameters(&enc);
        octx.write_header().unwrap();
        let time_base = octx.stream(0).unwrap().time_base();

        let mut to_yuv = scaling::Context::get(
            format::Pixel::RGB24,
            width,
            height,
            format::Pixel::YUV420P,
            width,
            height,
            scaling::Flags::BILINEAR,
        )
        .unwrap();

        let mut packet = Packet::empty();
        for i in 0..count {
            let mut rgb = Video::new(format::Pixel::RGB24, width, height);
            rgb.data_mut(0).fill(((i * 40) % 256) as u8);
            let mut yuv = Video::empty();
            to_yuv.run(&rgb, &mut yuv).unwrap();
            yuv.set_pts(Some(i as i64));
            enc.send_frame(&yuv).unwrap();
            while enc.receive_packet(&mut packet).is_ok() {
                packet.set_stream(0);
                packet.rescale_ts(Rational(1, 25), time_base);
                packet.write_interleaved(&mut octx).unwrap();
            }
        }
        enc.send_eof().unwrap();
        while enc.receive_packet(&mut packet).is_ok() {
            packet.set_stream(0);
            packet.rescale_ts(Rational(1, 25), time_base);
            packet.write_interleaved(&mut octx).unwrap();
        }
        octx.write_trailer().unwrap();
    }

    #[test]
    fn test_open_returns_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fish.mp4");
        write_test_video(&path, 5, 160, 120);

        let mut reader = FfmpegReader::new();
        let meta = reader.open(&path).unwrap();
        assert_eq!(meta.width, 160);
        assert_eq!(meta.height, 120);
        assert!(meta.fps > 0.0);
        assert_eq!(meta.source_path, Some(path));
    }

    #[test]
    fn test_frames_are_indexed_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fish.mp4");
        write_test_video(&path, 5, 160, 120);

        let mut reader = FfmpegReader::new();
        reader.open(&path).unwrap();
        let frames: Vec<Frame> = reader.frames().collect::<Result<_, _>>().unwrap();

        assert_eq!(frames.len(), 5);
        for (i, frame) in frames.iter().enumerate() {
            assert_eq!(frame.index(), i);
            assert_eq!(frame.width(), 160);
            assert_eq!(frame.data().len(), 160 * 120 * 3);
        }
    }

    #[test]
    fn test_open_nonexistent_errors() {
        let mut reader = FfmpegReader::new();
        assert!(reader.open(Path::new("/nonexistent/fish.mp4")).is_err());
    }

    #[test]
    fn test_frames_without_open_errors() {
        let mut reader = FfmpegReader::new();
        assert!(reader.frames().next().unwrap().is_err());
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut reader = FfmpegReader::new();
        reader.close();
        reader.close();
    }
}
