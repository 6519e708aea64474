//! Opening links outside the application.

/// Opens URLs in the user's default browser.
pub trait ExternalOpener {
    /// Open `url` externally.
    fn open_external(&self, url: &str) -> std::io::Result<()>;
}

/// Opens URLs with the platform's default handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemOpener;

impl ExternalOpener for SystemOpener {
    fn open_external(&self, url: &str) -> std::io::Result<()> {
        open::that(url)
    }
}
