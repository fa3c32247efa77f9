mod xcap_capture_platform;

pub use xcap_capture_platform::XcapCapturePlatform;
