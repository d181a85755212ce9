pub mod config {
    use serde::Deserialize;

    #[derive(Deserialize, Debug, Clone, PartialEq)]
    pub struct Config {
        #[serde(default = "default_port")]
        pub port: u16,
        /// Path of the SQLite database file, created on first start.
        #[serde(default = "default_dbfile")]
        pub dbfile: String,
        /// Directory served for every path outside the API.
        #[serde(default = "default_web_dir")]
        pub web_dir: String,
        /// Maximum number of tasks returned by a listing or search.
        #[serde(default = "default_tasks_limit")]
        pub tasks_limit: u64,
    }

    impl Config {
        /// Loads configuration from `TODO_*` environment variables.
        pub fn from_env() -> anyhow::Result<Self> {
            Self::from_environment(config::Environment::with_prefix("TODO"))
        }

        fn from_environment(environment: config::Environment) -> anyhow::Result<Self> {
            let settings = config::Config::builder()
                .add_source(environment.try_parsing(true))
                .build()?;

            let config: Config = settings.try_deserialize()?;
            Ok(config)
        }

        /// Connection URL of the SQLite database.
        pub fn db_url(&self) -> String {
            format!("sqlite://{}?mode=rwc", self.dbfile)
        }
    }

    fn default_port() -> u16 {
        7540
    }

    fn default_dbfile() -> String {
        "scheduler.db".to_string()
    }

    fn default_web_dir() -> String {
        "./web".to_string()
    }

    fn default_tasks_limit() -> u64 {
        10
    }

}
pub mod entities;
pub mod nextdate;
pub mod task;
pub mod web;
