use cosmwasm_std::{
    ensure_eq, entry_point, to_binary, Deps, DepsMut, Env, HexBinary, MessageInfo, QueryResponse,
    Response, StdResult, Uint128, Uint256, WasmMsg,
};
use cw2::{get_contract_version, set_contract_version};
use cw20::{BalanceResponse as Cw20BalanceResponse, Cw20ExecuteMsg, Cw20QueryMsg};

use crate::error::ContractError;
use crate::msg::{
    ConfigResponse, ExecuteMsg, GuessResponse, InstantiateMsg, LastRandomNumberResponse,
    MigrateMsg, OracleExecuteMsg, PlayerBalanceResponse, QueryMsg, RequestInfo, RequestResponse,
};
use crate::state::{
    Config, RandomResult, RandomnessRequest, BALANCES, CONFIG, GUESSES, RANDOM_RESULT, REQUEST,
    SETTLED,
};

const CONTRACT_NAME: &str = "crates.io:dice-guess";
const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Extra allowance granted to the oracle on top of the fee limit, in
/// percent. Covers fee variance between request and fulfillment.
const FEE_MARGIN_PERCENT: u128 = 20;

const MIN_GUESS: u8 = 1;
const MAX_GUESS: u8 = 6;

#[entry_point]
pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    let owner = match msg.owner {
        Some(o) => deps
            .api
            .addr_validate(&o)
            .map_err(|_| ContractError::InvalidOwnerAddress)?,
        None => info.sender,
    };
    let oracle = deps
        .api
        .addr_validate(&msg.oracle_address)
        .map_err(|_| ContractError::InvalidOracleAddress)?;
    let fee_token = deps
        .api
        .addr_validate(&msg.fee_token_address)
        .map_err(|_| ContractError::InvalidFeeTokenAddress)?;
    let reward_token = deps
        .api
        .addr_validate(&msg.reward_token_address)
        .map_err(|_| ContractError::InvalidRewardTokenAddress)?;

    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    let config = Config {
        owner,
        oracle,
        fee_token,
        reward_token,
    };
    CONFIG.save(deps.storage, &config)?;

    Ok(Response::default())
}

#[entry_point]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        ExecuteMsg::UpdateConfig {
            owner,
            oracle_address,
            fee_token_address,
            reward_token_address,
        } => execute_update_config(
            deps,
            env,
            info,
            owner,
            oracle_address,
            fee_token_address,
            reward_token_address,
        ),
        ExecuteMsg::Guess { value } => execute_guess(deps, env, info, value),
        // RequestRandomness is triggered by the owner to buy a random beacon for the game
        ExecuteMsg::RequestRandomness {
            seed,
            fee_limit,
            publish_delay,
            num_words,
            extra_data,
        } => execute_request_randomness(
            deps,
            env,
            info,
            seed,
            fee_limit,
            publish_delay,
            num_words,
            extra_data,
        ),
        // ReceiveRandomWords should be called by the oracle contract once the beacon is published
        ExecuteMsg::ReceiveRandomWords {
            requester,
            request_id,
            words,
            extra_data,
        } => execute_receive_random_words(deps, env, info, requester, request_id, words, extra_data),
        ExecuteMsg::ProcessRandomness {} => execute_settle(deps, info, "process_randomness"),
        ExecuteMsg::ClaimPrize {} => execute_settle(deps, info, "claim_prize"),
        ExecuteMsg::WithdrawSurplus { receiver } => {
            execute_withdraw_surplus(deps, env, info, receiver)
        }
    }
}

#[entry_point]
pub fn query(deps: Deps, _env: Env, msg: QueryMsg) -> StdResult<QueryResponse> {
    let response = match msg {
        QueryMsg::Config {} => to_binary(&query_config(deps)?)?,
        QueryMsg::LastRandomNumber {} => to_binary(&query_last_random_number(deps)?)?,
        QueryMsg::Guess { player } => to_binary(&query_guess(deps, player)?)?,
        QueryMsg::Balance { player } => to_binary(&query_balance(deps, player)?)?,
        QueryMsg::Request {} => to_binary(&query_request(deps)?)?,
    };
    Ok(response)
}

#[entry_point]
pub fn migrate(deps: DepsMut, _env: Env, _msg: MigrateMsg) -> Result<Response, ContractError> {
    let version = get_contract_version(deps.storage)?;
    if version.contract != CONTRACT_NAME {
        return Err(ContractError::CannotMigrate {
            previous_contract: version.contract,
        });
    }
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;
    Ok(Response::default())
}

fn execute_update_config(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    owner: Option<String>,
    oracle_address: Option<String>,
    fee_token_address: Option<String>,
    reward_token_address: Option<String>,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    // check the calling address is the configured owner
    ensure_eq!(info.sender, config.owner, ContractError::Unauthorized);

    let owner = match owner {
        Some(o) => deps
            .api
            .addr_validate(&o)
            .map_err(|_| ContractError::InvalidOwnerAddress)?,
        None => config.owner,
    };
    let oracle = match oracle_address {
        Some(o) => deps
            .api
            .addr_validate(&o)
            .map_err(|_| ContractError::InvalidOracleAddress)?,
        None => config.oracle,
    };
    let fee_token = match fee_token_address {
        Some(t) => deps
            .api
            .addr_validate(&t)
            .map_err(|_| ContractError::InvalidFeeTokenAddress)?,
        None => config.fee_token,
    };
    let reward_token = match reward_token_address {
        Some(t) => deps
            .api
            .addr_validate(&t)
            .map_err(|_| ContractError::InvalidRewardTokenAddress)?,
        None => config.reward_token,
    };

    CONFIG.save(
        deps.storage,
        &Config {
            owner,
            oracle,
            fee_token,
            reward_token,
        },
    )?;

    Ok(Response::new().add_attribute("action", "update_config"))
}

fn execute_guess(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    value: u8,
) -> Result<Response, ContractError> {
    if !(MIN_GUESS..=MAX_GUESS).contains(&value) {
        return Err(ContractError::InvalidGuess { value });
    }
    GUESSES.save(deps.storage, &info.sender, &value)?;

    Ok(Response::new()
        .add_attribute("action", "guess")
        .add_attribute("player", info.sender)
        .add_attribute("value", value.to_string()))
}

// This function will pre-approve the oracle for the margin-adjusted fee and
// ask it for random words. The value itself arrives later through
// `ReceiveRandomWords`, at the earliest `publish_delay` blocks from now.
#[allow(clippy::too_many_arguments)]
fn execute_request_randomness(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    seed: u64,
    fee_limit: Uint128,
    publish_delay: u64,
    num_words: u64,
    extra_data: Option<HexBinary>,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    ensure_eq!(info.sender, config.owner, ContractError::Unauthorized);

    // The oracle may charge slightly more than the estimate, so the
    // allowance carries a fixed margin which the escrow must cover in full.
    let required = fee_limit.multiply_ratio(100 + FEE_MARGIN_PERCENT, 100u128);
    let escrow: Cw20BalanceResponse = deps.querier.query_wasm_smart(
        config.fee_token.clone(),
        &Cw20QueryMsg::Balance {
            address: env.contract.address.to_string(),
        },
    )?;
    if escrow.balance < required {
        return Err(ContractError::InsufficientFunds {
            required,
            available: escrow.balance,
        });
    }

    let approve_msg = WasmMsg::Execute {
        contract_addr: config.fee_token.into_string(),
        msg: to_binary(&Cw20ExecuteMsg::IncreaseAllowance {
            spender: config.oracle.to_string(),
            amount: required,
            expires: None,
        })?,
        funds: vec![],
    };
    let request_msg = WasmMsg::Execute {
        contract_addr: config.oracle.to_string(),
        msg: to_binary(&OracleExecuteMsg::RequestRandom {
            seed,
            callback_address: env.contract.address.into_string(),
            fee_limit,
            publish_delay,
            num_words,
            extra_data,
        })?,
        funds: vec![],
    };

    let min_accept_height = env.block.height + publish_delay;
    REQUEST.save(
        deps.storage,
        &RandomnessRequest {
            oracle: config.oracle,
            min_accept_height,
        },
    )?;

    Ok(Response::new()
        .add_message(approve_msg)
        .add_message(request_msg)
        .add_attribute("action", "request_randomness")
        .add_attribute("reserved_fee", required)
        .add_attribute("min_accept_height", min_accept_height.to_string()))
}

fn execute_receive_random_words(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    requester: String,
    request_id: u64,
    words: Vec<Uint256>,
    _extra_data: Option<HexBinary>,
) -> Result<Response, ContractError> {
    let request = REQUEST.load(deps.storage)?;

    // The sender is checked against the oracle recorded at request time,
    // otherwise anyone could deliver a value of their choosing.
    ensure_eq!(info.sender, request.oracle, ContractError::UntrustedCaller);
    if env.block.height < request.min_accept_height {
        return Err(ContractError::CallbackTooEarly {
            min_accept_height: request.min_accept_height,
            current: env.block.height,
        });
    }

    let value = *words.first().ok_or(ContractError::InvalidRandomness)?;
    RANDOM_RESULT.save(deps.storage, &RandomResult { value, request_id })?;

    Ok(Response::new()
        .add_attribute("action", "receive_random_words")
        .add_attribute("requester", requester)
        .add_attribute("request_id", request_id.to_string())
        .add_attribute("value", value.to_string()))
}

// Shared settlement path for ProcessRandomness and ClaimPrize. Each
// (player, request_id) pair settles at most once, win or lose, so a win
// cannot be paid twice and a loss cannot be retried against a value that
// is already public.
fn execute_settle(
    deps: DepsMut,
    info: MessageInfo,
    action: &str,
) -> Result<Response, ContractError> {
    let guess = GUESSES.load(deps.storage, &info.sender)?;

    let result = match RANDOM_RESULT.may_load(deps.storage)? {
        Some(r) => r,
        // No randomness delivered yet. Documented no-op, the caller can
        // try again once the callback has landed.
        None => {
            return Ok(Response::new()
                .add_attribute("action", action)
                .add_attribute("player", info.sender)
                .add_attribute("outcome", "pending"))
        }
    };

    if SETTLED.has(deps.storage, (&info.sender, result.request_id)) {
        return Err(ContractError::AlreadySettled {
            request_id: result.request_id,
        });
    }
    SETTLED.save(deps.storage, (&info.sender, result.request_id), &true)?;

    let won = result.value == Uint256::from(guess);
    let mut response = Response::new()
        .add_attribute("action", action)
        .add_attribute("player", info.sender.clone())
        .add_attribute("guess", guess.to_string())
        .add_attribute("outcome", if won { "won" } else { "lost" });

    if won {
        let config = CONFIG.load(deps.storage)?;
        BALANCES.update(deps.storage, &info.sender, |balance| -> StdResult<_> {
            Ok(balance.unwrap_or_default() + Uint128::one())
        })?;
        response = response.add_message(WasmMsg::Execute {
            contract_addr: config.reward_token.into_string(),
            msg: to_binary(&Cw20ExecuteMsg::Transfer {
                recipient: info.sender.into_string(),
                amount: Uint128::one(),
            })?,
            funds: vec![],
        });
    }

    Ok(response)
}

fn execute_withdraw_surplus(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    receiver: String,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    ensure_eq!(info.sender, config.owner, ContractError::Unauthorized);
    let receiver = deps.api.addr_validate(&receiver)?;

    let escrow: Cw20BalanceResponse = deps.querier.query_wasm_smart(
        config.fee_token.clone(),
        &Cw20QueryMsg::Balance {
            address: env.contract.address.to_string(),
        },
    )?;
    let msg = WasmMsg::Execute {
        contract_addr: config.fee_token.into_string(),
        msg: to_binary(&Cw20ExecuteMsg::Transfer {
            recipient: receiver.to_string(),
            amount: escrow.balance,
        })?,
        funds: vec![],
    };

    Ok(Response::new()
        .add_message(msg)
        .add_attribute("action", "withdraw_surplus")
        .add_attribute("receiver", receiver)
        .add_attribute("amount", escrow.balance))
}

fn query_config(deps: Deps) -> StdResult<ConfigResponse> {
    let config = CONFIG.load(deps.storage)?;
    Ok(ConfigResponse {
        owner: config.owner.into(),
        oracle_address: config.oracle.into(),
        fee_token_address: config.fee_token.into(),
        reward_token_address: config.reward_token.into(),
    })
}

fn query_last_random_number(deps: Deps) -> StdResult<LastRandomNumberResponse> {
    let value = RANDOM_RESULT
        .may_load(deps.storage)?
        .map(|result| result.value);
    Ok(LastRandomNumberResponse { value })
}

fn query_guess(deps: Deps, player: String) -> StdResult<GuessResponse> {
    let player = deps.api.addr_validate(&player)?;
    let guess = GUESSES.may_load(deps.storage, &player)?;
    Ok(GuessResponse { guess })
}

fn query_balance(deps: Deps, player: String) -> StdResult<PlayerBalanceResponse> {
    let player = deps.api.addr_validate(&player)?;
    let amount = BALANCES
        .may_load(deps.storage, &player)?
        .unwrap_or_default();
    Ok(PlayerBalanceResponse { amount })
}

fn query_request(deps: Deps) -> StdResult<RequestResponse> {
    let request = REQUEST.may_load(deps.storage)?.map(|r| RequestInfo {
        oracle_address: r.oracle.into(),
        min_accept_height: r.min_accept_height,
    });
    Ok(RequestResponse { request })
}
