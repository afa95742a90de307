use std::path::Path;

/// Container formats accepted for student transmissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioFormat {
    Mpeg,
    Mp3,
    Mp4,
    XM4a,
    M4a,
}

impl AudioFormat {
    pub const DEFAULT: Self = Self::Mpeg;

    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "audio/mpeg" => Some(Self::Mpeg),
            "audio/mp3" => Some(Self::Mp3),
            "audio/mp4" => Some(Self::Mp4),
            "audio/x-m4a" => Some(Self::XM4a),
            "audio/m4a" => Some(Self::M4a),
            _ => None,
        }
    }

    /// MIME type guessed from a file name, the way browsers label uploads.
    pub fn guess_mime_from_filename(filename: &str) -> Option<&'static str> {
        let extension = Path::new(filename).extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "mp3" => Some("audio/mpeg"),
            "mp4" => Some("video/mp4"),
            "m4a" => Some("audio/mp4"),
            "wav" => Some("audio/x-wav"),
            "ogg" => Some("audio/ogg"),
            "webm" => Some("video/webm"),
            _ => None,
        }
    }

    /// Resolves the declared type of an upload.
    ///
    /// The client's content type wins; without one the file extension is
    /// consulted and then `audio/mpeg` is assumed. The resolved type must be
    /// one of the accepted formats, otherwise the offending MIME is returned.
    pub fn resolve(content_type: Option<&str>, filename: Option<&str>) -> Result<Self, String> {
        let declared = content_type
            .map(str::trim)
            .filter(|ct| !ct.is_empty())
            .map(str::to_string)
            .or_else(|| filename.and_then(Self::guess_mime_from_filename).map(str::to_string))
            .unwrap_or_else(|| Self::DEFAULT.as_mime().to_string());

        Self::from_mime(&declared).ok_or(declared)
    }

    pub fn as_mime(&self) -> &'static str {
        match self {
            Self::Mpeg => "audio/mpeg",
            Self::Mp3 => "audio/mp3",
            Self::Mp4 => "audio/mp4",
            Self::XM4a => "audio/x-m4a",
            Self::M4a => "audio/m4a",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Mpeg | Self::Mp3 => "mp3",
            Self::Mp4 => "mp4",
            Self::XM4a | Self::M4a => "m4a",
        }
    }

    /// File name used when forwarding the upload to a transcription API.
    pub fn upload_filename(&self) -> String {
        format!("transmission.{}", self.extension())
    }
}
