#[cfg(test)]
pub mod test {
    use crate::Registry;

    /// Declaration text in the style the doc extractor understands: one
    /// old-style entry without a comment, then new-style entries with comments.
    pub const DECLARATION: &str = r#"
  def self.allowed_variables
    {
      :my_var => 'default value',
      timeout: 30, # Seconds to wait before
                   # giving up on a request
      base_url: "http://localhost:8080", # Where the API lives
      :default_is_nil => nil
    }
  end
"#;

    /// `my_var` (documented), `default_is_nil` (absent default) and `debug`,
    /// with env prefix `PREF_`.
    pub fn sample_registry() -> Registry {
        Registry::builder()
            .variable("my_var", "default value")
            .describe("my_var", "A plain string variable.")
            .variable("default_is_nil", None::<&str>)
            .variable("debug", "false")
            .env_prefix("PREF_")
            .build()
            .unwrap()
    }

    #[test]
    fn sample_registry_builds() {
        let reg = sample_registry();
        assert_eq!(reg.variables().len(), 3);
        assert_eq!(reg.env_prefix(), "PREF_");
    }
}
