use soroban_sdk::{Address, Env};

use crate::config::{ConfigManager, EngineConfig};
use crate::errors::Error;
use crate::events::EventEmitter;
use crate::storage::Storage;
use crate::types::Pool;

/// Admin access control.
///
/// The engine has a single privileged role. Privileged entry points call
/// [`AdminAccessControl::require_admin_auth`] before touching any state, so an
/// unauthorized call never mutates the ledger.
pub struct AdminAccessControl;

impl AdminAccessControl {
    /// One-time setup: stores the admin and the default engine config.
    pub fn initialize(
        env: &Env,
        admin: &Address,
        token: &Address,
        treasury: &Address,
    ) -> Result<(), Error> {
        if Storage::get_admin(env).is_some() {
            return Err(Error::AlreadyInitialized);
        }
        admin.require_auth();

        Storage::set_admin(env, admin);
        ConfigManager::store_config(
            env,
            &ConfigManager::default_config(token.clone(), treasury.clone()),
        )?;

        EventEmitter::emit_initialized(env, admin, token);
        Ok(())
    }

    pub fn require_admin_auth(env: &Env, admin: &Address) -> Result<(), Error> {
        admin.require_auth();

        let stored_admin = Storage::get_admin(env).ok_or(Error::AdminNotSet)?;
        if admin != &stored_admin {
            return Err(Error::Unauthorized);
        }

        Ok(())
    }

    /// Pool creators may manage their own pool's resolution settings.
    pub fn require_creator_or_admin(env: &Env, caller: &Address, pool: &Pool) -> Result<(), Error> {
        caller.require_auth();

        if caller == &pool.creator {
            return Ok(());
        }
        match Storage::get_admin(env) {
            Some(admin) if &admin == caller => Ok(()),
            Some(_) => Err(Error::Unauthorized),
            None => Err(Error::AdminNotSet),
        }
    }

    pub fn update_config(env: &Env, admin: &Address, config: &EngineConfig) -> Result<(), Error> {
        Self::require_admin_auth(env, admin)?;
        ConfigManager::store_config(env, config)?;
        EventEmitter::emit_config_updated(env, admin);
        Ok(())
    }
}
