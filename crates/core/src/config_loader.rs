use crate::config::AppConfig;
use anyhow::Result;
use figment::{
    providers::{Env, Format, Json, Serialized, Toml},
    Figment,
};
use std::path::Path;

/// Environment variable prefix, e.g. `RETAIL_KPI_ENGINE__RANKING_SIZE=10`.
pub const ENV_PREFIX: &str = "RETAIL_KPI_";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads configuration from a TOML file, then environment variables, then
    /// the `Config.json` beside it.
    ///
    /// Missing files are skipped, so a path that does not exist yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file exists but cannot be parsed.
    pub fn load_from(path: &str) -> Result<AppConfig> {
        Self::figment(Path::new(path), None).extract().map_err(Into::into)
    }

    /// Loads `path` with the `Config.{profile}.toml` next to it layered on top.
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file exists but cannot be parsed.
    pub fn load_with_profile(path: &str, profile: &str) -> Result<AppConfig> {
        Self::figment(Path::new(path), Some(profile))
            .extract()
            .map_err(Into::into)
    }

    fn figment(path: &Path, profile: Option<&str>) -> Figment {
        let mut figment =
            Figment::from(Serialized::defaults(AppConfig::default())).merge(Toml::file(path));
        if let Some(profile) = profile {
            figment = figment.merge(Toml::file(
                path.with_file_name(format!("Config.{profile}.toml")),
            ));
        }
        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .join(Json::file(path.with_file_name("Config.json")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;

    #[test]
    fn defaults_when_no_files_present() {
        let config = ConfigLoader::load_from("does/not/exist.toml").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.engine.stagnant_sales_ratio, dec!(0.05));
    }

    #[test]
    fn toml_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[engine]\nranking_size = 10\nexcluded_store_codes = [\"HK050\", \"MC009\"]\n\n[data]\ndata_dir = \"/srv/snapshots\""
        )
        .unwrap();

        let config = ConfigLoader::load_from(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.engine.ranking_size, 10);
        assert_eq!(config.engine.excluded_store_codes, vec!["HK050", "MC009"]);
        assert_eq!(config.engine.stagnant_top_n, 20);
        assert_eq!(config.data.data_dir, "/srv/snapshots");
        assert_eq!(config.data.pl_file, "pl_{period}.json");
    }

    #[test]
    fn profile_file_layers_over_base() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("Config.toml");
        std::fs::write(&base, "[engine]\nranking_size = 10\nstagnant_top_n = 5\n").unwrap();
        std::fs::write(
            dir.path().join("Config.audit.toml"),
            "[engine]\nstagnant_top_n = 0\n",
        )
        .unwrap();

        let config = ConfigLoader::load_with_profile(base.to_str().unwrap(), "audit").unwrap();
        assert_eq!(config.engine.ranking_size, 10);
        assert_eq!(config.engine.stagnant_top_n, 0);

        let config = ConfigLoader::load_with_profile(base.to_str().unwrap(), "absent").unwrap();
        assert_eq!(config.engine.stagnant_top_n, 5);
    }
}
