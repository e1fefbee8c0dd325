use std::env;

use serde::{Deserialize, Serialize};

use crate::err::{
    Error,
    Result,
};


pub static ENV_NULL_POLICY: &'static str = "CQL_NULL_POLICY";


// What a non nullable getter does when the cell is null.
// - The ABI does not define the value returned for a null cell; the CQL runtime returns zeroed memory.
#[derive(Debug)]
#[derive(PartialEq)]
#[derive(Serialize, Deserialize)]
#[derive(Clone, Copy)]
#[serde(rename_all = "kebab-case")]
pub enum NullPolicy {
    // Pass straight through, return whatever the engine returns.
    #[serde(alias = "engine")]
    EngineDefined,

    // Check `is_null` first and return `Error::NullValue`.
    FailFast,
}

impl Default for NullPolicy {
    fn default() -> NullPolicy {
        NullPolicy::EngineDefined
    }
}

impl NullPolicy {
    pub fn parse(s: &str) -> Result<NullPolicy> {
        match s.trim().to_lowercase().as_str() {
            "engine" | "engine-defined" => Ok(NullPolicy::EngineDefined),
            "fail-fast" | "failfast" => Ok(NullPolicy::FailFast),
            other => Err(Error::Config(format!("unknown {} `{}`", ENV_NULL_POLICY, other)))
        }
    }
}


#[derive(Debug)]
#[derive(PartialEq)]
#[derive(Serialize, Deserialize)]
#[derive(Clone, Default)]
#[serde(default)]
pub struct Config {
    pub null_policy: NullPolicy,
}


impl Config {
    pub fn from_env() -> Result<Config> {
        let mut c = Config::default();

        if let Ok(v) = env::var(ENV_NULL_POLICY) {
            c.null_policy = NullPolicy::parse(&v)?;
        }

        Ok(c)
    }

    pub fn from_json(s: &str) -> Result<Config> {
        serde_json::from_str(s).map_err(|e| Error::Config(e.to_string()))
    }
}
