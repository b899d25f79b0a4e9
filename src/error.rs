use thiserror::Error;

use cosmwasm_std::{StdError, Uint128};

#[derive(Error, Debug, PartialEq)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("Unauthorized.")]
    Unauthorized,

    #[error("Owner address is not valid")]
    InvalidOwnerAddress,

    #[error("Oracle address is not valid")]
    InvalidOracleAddress,

    #[error("Fee token address is not valid")]
    InvalidFeeTokenAddress,

    #[error("Reward token address is not valid")]
    InvalidRewardTokenAddress,

    #[error("Guess {value} is outside the allowed range 1-6")]
    InvalidGuess { value: u8 },

    // callback should only be allowed to be called by the oracle contract
    // otherwise anyone can cut the randomness workflow and cheat the randomness
    #[error("Untrusted caller for the randomness callback")]
    UntrustedCaller,

    #[error("Callback at height {current} is earlier than the accept height {min_accept_height}")]
    CallbackTooEarly {
        min_accept_height: u64,
        current: u64,
    },

    #[error("Escrow holds {available} of the fee token but {required} is needed to cover the margin")]
    InsufficientFunds {
        required: Uint128,
        available: Uint128,
    },

    #[error("Received invalid randomness")]
    InvalidRandomness,

    #[error("Request {request_id} was already settled for this player")]
    AlreadySettled { request_id: u64 },

    #[error("Cannot migrate from different contract type: {previous_contract}")]
    CannotMigrate { previous_contract: String },
}
