use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Uint128, Uint256};
use cw_storage_plus::{Item, Map};

#[cw_serde]
pub struct Config {
    /// owner that can trigger randomness requests, rotate addresses or withdraw the fee surplus
    pub owner: Addr,
    // The oracle contract from which to request the randomness
    pub oracle: Addr,
    // cw20 token used to pay the oracle fee
    pub fee_token: Addr,
    // cw20 token paid out to winners
    pub reward_token: Addr,
}

/// The outstanding randomness request. Overwritten by the next request,
/// never deleted.
#[cw_serde]
pub struct RandomnessRequest {
    // The oracle address at the time the request was made. The callback
    // sender is checked against this snapshot, not the live config.
    pub oracle: Addr,
    // Earliest block height at which a callback for this request is accepted
    pub min_accept_height: u64,
}

/// The accepted random value. Absence of the Item means no callback has
/// been accepted yet; later accepted callbacks overwrite it.
#[cw_serde]
pub struct RandomResult {
    pub value: Uint256,
    // The oracle's id for the request this value answers. Settlement is
    // keyed on it so each player settles a given request at most once.
    pub request_id: u64,
}

pub const CONFIG_KEY: &str = "config";
pub const CONFIG: Item<Config> = Item::new(CONFIG_KEY);

pub const REQUEST: Item<RandomnessRequest> = Item::new("request");
pub const RANDOM_RESULT: Item<RandomResult> = Item::new("random_result");

/// One active guess per player, overwritten by each new guess.
pub const GUESSES: Map<&Addr, u8> = Map::new("g");

/// Per-player accrued reward count.
pub const BALANCES: Map<&Addr, Uint128> = Map::new("b");

/// Settlement flags keyed by (player, request_id).
pub const SETTLED: Map<(&Addr, u64), bool> = Map::new("s");
