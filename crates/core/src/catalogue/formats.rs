//! Static format table.
//!
//! Order inside each kind is the order the selection surface lists them.

use super::types::{FormatSpec, MediaKind};

const fn image(extension: &'static str, media_type: &'static str, args: &'static [&'static str]) -> FormatSpec {
    FormatSpec {
        extension,
        kind: MediaKind::Image,
        media_type,
        args,
    }
}

const fn video(extension: &'static str, media_type: &'static str, args: &'static [&'static str]) -> FormatSpec {
    FormatSpec {
        extension,
        kind: MediaKind::Video,
        media_type,
        args,
    }
}

const fn audio(extension: &'static str, media_type: &'static str, args: &'static [&'static str]) -> FormatSpec {
    FormatSpec {
        extension,
        kind: MediaKind::Audio,
        media_type,
        args,
    }
}

const NONE: &[&str] = &[];

const H264_AAC: &[&str] = &[
    "-c:v", "libx264", "-preset", "medium", "-crf", "23", "-c:a", "aac", "-b:a", "192k",
];

pub(crate) static FORMATS: &[FormatSpec] = &[
    // Image
    image("jpg", "image/jpeg", &["-q:v", "2"]),
    image("jpeg", "image/jpeg", &["-q:v", "2"]),
    image("png", "image/png", &["-pix_fmt", "rgb8"]),
    image("gif", "image/gif", &["-f", "gif"]),
    image("bmp", "image/bmp", &["-f", "bmp"]),
    image("webp", "image/webp", NONE),
    image("ico", "image/x-icon", NONE),
    image("tif", "image/tiff", NONE),
    image("tiff", "image/tiff", &["-f", "tiff"]),
    image("svg", "image/svg+xml", NONE),
    image("raw", "image/x-raw", NONE),
    image("tga", "image/x-tga", NONE),
    // Video
    video(
        "mp4",
        "video/mp4",
        &[
            "-movflags", "+faststart", "-c:v", "libx264", "-preset", "medium", "-crf", "23",
            "-c:a", "aac", "-b:a", "192k",
        ],
    ),
    video("m4v", "video/x-m4v", NONE),
    video("mp4v", "video/mp4", NONE),
    video(
        "3gp",
        "video/3gpp",
        &[
            "-r", "20", "-s", "352x288", "-vb", "400k", "-acodec", "aac", "-strict",
            "experimental", "-ac", "1", "-ar", "8000", "-ab", "24k",
        ],
    ),
    video("3g2", "video/3gpp2", NONE),
    video(
        "avi",
        "video/x-msvideo",
        &["-c:v", "libxvid", "-b:v", "1000k", "-c:a", "mp3"],
    ),
    video("mov", "video/quicktime", H264_AAC),
    video("wmv", "video/x-ms-wmv", NONE),
    video("mkv", "video/x-matroska", NONE),
    video("flv", "video/x-flv", NONE),
    video("ogv", "video/ogg", NONE),
    video(
        "webm",
        "video/webm",
        &["-c:v", "libvpx", "-b:v", "1000k", "-c:a", "libvorbis"],
    ),
    video("h264", "video/h264", NONE),
    video("264", "video/h264", NONE),
    video("hevc", "video/h265", NONE),
    video("265", "video/h265", NONE),
    // Audio
    audio("mp3", "audio/mpeg", &["-c:a", "libmp3lame", "-b:a", "192k"]),
    audio(
        "wav",
        "audio/wav",
        &["-c:a", "pcm_s16le", "-ar", "44100", "-ac", "2"],
    ),
    audio("ogg", "audio/ogg", &["-c:a", "libvorbis", "-b:a", "192k"]),
    audio("aac", "audio/aac", NONE),
    audio("wma", "audio/x-ms-wma", NONE),
    audio("flac", "audio/flac", &["-c:a", "flac"]),
    audio("m4a", "audio/mp4", &["-c:a", "aac", "-b:a", "192k"]),
];
