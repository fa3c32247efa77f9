mod png_region_saver;

pub use png_region_saver::PngRegionSaver;
