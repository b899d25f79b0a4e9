use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{HexBinary, Uint128, Uint256};

#[cw_serde]
pub struct InstantiateMsg {
    /// owner if none set to info.sender.
    pub owner: Option<String>,
    /// Address of the randomness oracle contract
    pub oracle_address: String,
    /// Address of the cw20 token used to pay the oracle fee
    pub fee_token_address: String,
    /// Address of the cw20 token paid out to winners
    pub reward_token_address: String,
}

#[cw_serde]
pub enum ExecuteMsg {
    UpdateConfig {
        owner: Option<String>,
        oracle_address: Option<String>,
        fee_token_address: Option<String>,
        reward_token_address: Option<String>,
    },
    // Store the caller's guess. Values outside 1-6 are rejected. A new
    // guess replaces the previous one.
    Guess {
        value: u8,
    },
    // This will trigger fetching the unpredictable random beacon.
    // Pre-approves the oracle for the margin-adjusted fee and records the
    // earliest height at which the callback may land.
    RequestRandomness {
        seed: u64,
        /// Upper bound for the oracle fee. The escrow must cover this
        /// plus a 20% margin for fee variance.
        fee_limit: Uint128,
        /// Minimum number of blocks between the request and the callback
        publish_delay: u64,
        num_words: u64,
        extra_data: Option<HexBinary>,
    },
    // Callback carrying the random words. Should only be allowed to be
    // called by the oracle contract, and only once the publish delay of
    // the outstanding request has elapsed.
    ReceiveRandomWords {
        requester: String,
        request_id: u64,
        words: Vec<Uint256>,
        extra_data: Option<HexBinary>,
    },
    // Settle the caller's guess against the delivered random value.
    // Pays one reward token unit on a match, at most once per request.
    ProcessRandomness {},
    // Same settlement path as ProcessRandomness, exposed under the
    // player-facing name.
    ClaimPrize {},
    // Withdraw the full fee-token balance of the contract to the receiver
    WithdrawSurplus {
        receiver: String,
    },
}

/// The execute interface of the oracle contract, as far as this
/// contract needs it. The oracle later answers with
/// `ExecuteMsg::ReceiveRandomWords` on the callback address.
#[cw_serde]
pub enum OracleExecuteMsg {
    RequestRandom {
        seed: u64,
        callback_address: String,
        fee_limit: Uint128,
        publish_delay: u64,
        num_words: u64,
        extra_data: Option<HexBinary>,
    },
}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(ConfigResponse)]
    Config {},
    /// The last accepted random value. None until a callback is accepted.
    #[returns(LastRandomNumberResponse)]
    LastRandomNumber {},
    /// Query a player's stored guess
    #[returns(GuessResponse)]
    Guess { player: String },
    /// Query a player's accrued reward count
    #[returns(PlayerBalanceResponse)]
    Balance { player: String },
    /// The outstanding randomness request, if any was ever made
    #[returns(RequestResponse)]
    Request {},
}

#[cw_serde]
pub struct ConfigResponse {
    pub owner: String,
    pub oracle_address: String,
    pub fee_token_address: String,
    pub reward_token_address: String,
}

#[cw_serde]
pub struct LastRandomNumberResponse {
    pub value: Option<Uint256>,
}

#[cw_serde]
pub struct GuessResponse {
    // None means the player never guessed
    pub guess: Option<u8>,
}

#[cw_serde]
pub struct PlayerBalanceResponse {
    pub amount: Uint128,
}

#[cw_serde]
pub struct RequestResponse {
    pub request: Option<RequestInfo>,
}

#[cw_serde]
pub struct RequestInfo {
    pub oracle_address: String,
    pub min_accept_height: u64,
}

#[cw_serde]
pub struct MigrateMsg {}
