use soroban_sdk::{token, Address, Env};

use crate::config::ConfigManager;
use crate::errors::Error;

/// Moves funds between callers and the contract's escrow balance.
///
/// The contract's own token balance is the escrow: pool stakes, dispute bonds
/// and uncollected oracle fees all sit there until a transition releases them.
pub struct TokenEscrow;

impl TokenEscrow {
    fn client(env: &Env) -> Result<token::Client<'_>, Error> {
        let config = ConfigManager::get_config(env)?;
        Ok(token::Client::new(env, &config.token))
    }

    pub fn balance(env: &Env, owner: &Address) -> Result<i128, Error> {
        Ok(Self::client(env)?.balance(owner))
    }

    /// Pull `amount` from `from` into escrow.
    pub fn hold(env: &Env, from: &Address, amount: i128) -> Result<(), Error> {
        if amount <= 0 {
            return Ok(());
        }
        Self::client(env)?.transfer(from, &env.current_contract_address(), &amount);
        Ok(())
    }

    /// Pay `amount` out of escrow to `to`.
    pub fn release(env: &Env, to: &Address, amount: i128) -> Result<(), Error> {
        if amount <= 0 {
            return Ok(());
        }
        Self::client(env)?.transfer(&env.current_contract_address(), to, &amount);
        Ok(())
    }
}
