pub mod pe;

pub trait Header: std::fmt::Debug + Send + Sync {
    /// Returns the link timestamp recorded in the file header.
    fn time_date_stamp(&self) -> u32;

    /// Returns the image checksum from the optional header.
    fn checksum(&self) -> u32;

    /// Returns the in-memory size of the loaded image.
    fn size_of_image(&self) -> u32;

    /// Returns true if this is a 64-bit image.
    fn is_64(&self) -> bool;

    /// Returns a short human-readable name, e.g. "PE32" or "PE32+".
    fn format_name(&self) -> &'static str;
}
