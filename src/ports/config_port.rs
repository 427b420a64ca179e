//! Configuration access port trait.

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str, default: i64) -> i64;
    fn get_double(&self, section: &str, key: &str, default: f64) -> f64;
    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool;

    /// First non-blank value of `key`, searching `sections` in order.
    fn get_string_layered(&self, sections: &[&str], key: &str) -> Option<String> {
        sections.iter().find_map(|section| {
            self.get_string(section, key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        })
    }
}
