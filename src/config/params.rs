//! Named parameters for each operation, validated before any network call

use crate::config::error::{ConfigError, ConfigResult};
use std::collections::BTreeSet;

const MIN_ACCOUNT_ID_LEN: usize = 2;
const MAX_ACCOUNT_ID_LEN: usize = 64;

/// Check an account identifier against the ledger's naming rules: 2-64
/// characters of lowercase alphanumerics, with single `-`, `_` or `.`
/// separators that neither lead nor trail.
pub fn validate_account_id(account_id: &str) -> ConfigResult<()> {
    if !(MIN_ACCOUNT_ID_LEN..=MAX_ACCOUNT_ID_LEN).contains(&account_id.len()) {
        return Err(ConfigError::Validation(format!(
            "account id '{}' must be {}-{} characters",
            account_id, MIN_ACCOUNT_ID_LEN, MAX_ACCOUNT_ID_LEN
        )));
    }

    let mut after_separator = true;
    for c in account_id.chars() {
        match c {
            'a'..='z' | '0'..='9' => after_separator = false,
            '-' | '_' | '.' if !after_separator => after_separator = true,
            _ => {
                return Err(ConfigError::Validation(format!(
                    "account id '{}' contains invalid character or separator '{}'",
                    account_id, c
                )))
            }
        }
    }
    if after_separator {
        return Err(ConfigError::Validation(format!(
            "account id '{}' cannot end with a separator",
            account_id
        )));
    }
    Ok(())
}

fn require_non_empty(field: &str, value: &str) -> ConfigResult<()> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{} cannot be empty", field)));
    }
    Ok(())
}

/// Parameters for rotating one access key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotateKeyParams {
    pub account_id: String,
    /// Key to retire once the replacement is confirmed on the ledger
    pub old_public_key: String,
}

impl RotateKeyParams {
    pub fn new(account_id: impl Into<String>, old_public_key: impl Into<String>) -> ConfigResult<Self> {
        let params = Self {
            account_id: account_id.into(),
            old_public_key: old_public_key.into(),
        };
        validate_account_id(&params.account_id)?;
        require_non_empty("old public key", &params.old_public_key)?;
        Ok(params)
    }
}

/// Parameters for creating a testnet account through the account factory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateAccountParams {
    /// Existing account that signs and pays for the creation
    pub creator_account_id: String,
    pub new_account_id: String,
}

impl CreateAccountParams {
    pub fn new(
        creator_account_id: impl Into<String>,
        new_account_id: impl Into<String>,
    ) -> ConfigResult<Self> {
        let params = Self {
            creator_account_id: creator_account_id.into(),
            new_account_id: new_account_id.into(),
        };
        validate_account_id(&params.creator_account_id)?;
        validate_account_id(&params.new_account_id)?;
        if params.creator_account_id == params.new_account_id {
            return Err(ConfigError::Validation(
                "new account id must differ from the creator".to_string(),
            ));
        }
        Ok(params)
    }
}

/// Parameters for a function-call access key scoped to one contract
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionKeyParams {
    pub account_id: String,
    /// Contract the key may call
    pub contract_id: String,
    /// Methods the key may call; empty means any method of `contract_id`
    pub method_names: BTreeSet<String>,
    /// Gas allowance in yoctoNEAR; `None` leaves it unlimited
    pub allowance: Option<u128>,
}

impl FunctionKeyParams {
    pub fn new<I, S>(
        account_id: impl Into<String>,
        contract_id: impl Into<String>,
        method_names: I,
        allowance: Option<u128>,
    ) -> ConfigResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let params = Self {
            account_id: account_id.into(),
            contract_id: contract_id.into(),
            method_names: method_names.into_iter().map(Into::into).collect(),
            allowance,
        };
        validate_account_id(&params.account_id)?;
        validate_account_id(&params.contract_id)?;
        if let Some(name) = params.method_names.iter().find(|m| m.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "method name '{}' cannot be empty",
                name
            )));
        }
        Ok(params)
    }
}
