//! Behavior shared by every DOT network

use super::{SubVaultStrategy, TransferBuildContext, UpdateContext};
use crate::codec::to_hex;
use crate::error::{VaultError, VaultResult};
use crate::methods;
use crate::types::EncodedTransaction;
use crate::units::parse_units;

/// Balances calls that move a fixed amount
const FIXED_AMOUNT_TRANSFERS: &[&str] = &["transfer", "transferKeepAlive", "transferAllowDeath"];

/// Fallback strategy
#[derive(Debug, Default, Clone, Copy)]
pub struct Common;

impl SubVaultStrategy for Common {
    fn name(&self) -> &'static str {
        "common"
    }

    fn supports_network(&self, _network_id: &str, _chain_id: &str) -> bool {
        true
    }
}

/// `assets.transfer(_keep_alive)` for the token's asset id
pub fn build_token_transfer(ctx: &TransferBuildContext<'_>) -> VaultResult<EncodedTransaction> {
    let token = ctx
        .token
        .ok_or_else(|| VaultError::Internal("Token transfer without token info".to_string()))?;
    let asset_id = methods::parse_asset_id(&token.address)?;
    let payload = methods::assets_transfer(asset_id, ctx.to, ctx.amount, ctx.keep_alive)?;
    let method = ctx.base.registry.encode_call(&payload)?;
    Ok(ctx.base.encoded_tx(&method, ctx.nonce, 0))
}

pub fn build_native_transfer(ctx: &TransferBuildContext<'_>) -> VaultResult<EncodedTransaction> {
    let method = methods::native_transfer_for(&ctx.base.registry, ctx.to, ctx.amount, ctx.keep_alive)?;
    Ok(ctx.base.encoded_tx(&method, ctx.nonce, 0))
}

/// Sending the maximum turns a fixed native transfer into `transfer_all`
///
/// Best effort: only when the requested maximum reaches the sender's known
/// balance. Every other field of the transaction is kept.
pub async fn update_unsigned_tx(ctx: UpdateContext<'_>) -> VaultResult<Option<EncodedTransaction>> {
    let max_send_amount = match ctx
        .params
        .native_amount_info
        .as_ref()
        .and_then(|info| info.max_send_amount.as_deref())
    {
        Some(max) if !max.is_empty() => max,
        _ => return Ok(None),
    };
    if ctx.call.pallet != "balances" || !FIXED_AMOUNT_TRANSFERS.contains(&ctx.call.method.as_str()) {
        return Ok(None);
    }
    let dest = match ctx.call.arg_address("dest") {
        Some(dest) => dest,
        None => return Ok(None),
    };

    let network = ctx.vault.network().await?;
    let max_raw = parse_units(max_send_amount, network.decimals)?;
    let balance = ctx.vault.balance_of(&ctx.encoded_tx.address).await?;
    if max_raw < balance {
        return Ok(None);
    }

    let registry = ctx.vault.registry_for(ctx.encoded_tx).await?;
    let method = registry.encode_call(&methods::transfer_all(&dest, false)?)?;
    tracing::debug!(
        address = %ctx.encoded_tx.address,
        balance = %balance,
        "Sending full balance, rewriting as transfer_all"
    );
    Ok(Some(EncodedTransaction {
        method: to_hex(&method),
        ..ctx.encoded_tx.clone()
    }))
}
