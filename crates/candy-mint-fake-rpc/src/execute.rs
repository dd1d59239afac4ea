//! Instruction execution against the in-memory accounts

use std::collections::{HashMap, HashSet};

use candy_mint_common::layout::{CandyMachineAccount, WhitelistMintMode, DISCRIMINATOR_LEN};
use candy_mint_common::clock::ledger_now;
use candy_mint_common::{
    AccountInfo, Address, Amount, Instruction, ProgramErrorCode, TransactionError,
};

use crate::{derive_address, FAKE_PROGRAM_ID, METADATA_SEED, TOKEN_PROGRAM_ID};

/// Setup instruction: creates the collectible mint and its token account
pub const SETUP_TAG: u8 = 1;
/// Mint instruction: pays and mints one item
pub const MINT_TAG: u8 = 2;
/// Gating pass issuance
pub const PASS_TAG: u8 = 3;

/// Gating pass missing or expired
pub const GATEWAY_TOKEN_MISSING: ProgramErrorCode = ProgramErrorCode(0x13d);

/// Ledger contents
#[derive(Debug, Clone, Default)]
pub(crate) struct Accounts {
    pub accounts: HashMap<Address, AccountInfo>,
    /// (owner, mint) -> amount
    pub token_balances: HashMap<(Address, Address), u64>,
    /// (network, wallet)
    pub passes: HashSet<(Address, Address)>,
    /// Passes consumed by a mint, refreshed rather than issued
    pub expired_passes: HashSet<(Address, Address)>,
}

pub(crate) fn program_error(code: ProgramErrorCode) -> TransactionError {
    TransactionError {
        code: Some(code),
        message: format!("custom program error: 0x{:x}", code.0),
    }
}

fn rejected(message: impl Into<String>) -> TransactionError {
    TransactionError {
        code: None,
        message: message.into(),
    }
}

fn account_at(instruction: &Instruction, index: usize) -> Result<Address, TransactionError> {
    instruction
        .accounts
        .get(index)
        .map(|meta| meta.address)
        .ok_or_else(|| rejected(format!("NotEnoughAccountKeys: missing account {}", index)))
}

impl Accounts {
    pub fn lamports(&self, address: &Address) -> Amount {
        self.accounts
            .get(address)
            .map(|account| account.lamports)
            .unwrap_or(Amount::ZERO)
    }

    pub fn credit(&mut self, address: &Address, amount: Amount) {
        let account = self.accounts.entry(*address).or_insert_with(|| AccountInfo {
            owner: Address::default(),
            lamports: Amount::ZERO,
            data: Vec::new(),
        });
        account.lamports = account.lamports.checked_add(amount).unwrap_or(account.lamports);
    }

    pub fn token_balance(&self, owner: &Address, mint: &Address) -> u64 {
        self.token_balances
            .get(&(*owner, *mint))
            .copied()
            .unwrap_or_default()
    }

    fn create(&mut self, address: Address, owner: Address) -> Result<(), TransactionError> {
        if self.accounts.contains_key(&address) {
            return Err(rejected(format!("AccountInUse: {}", address)));
        }
        self.accounts.insert(
            address,
            AccountInfo {
                owner,
                lamports: Amount::ZERO,
                data: Vec::new(),
            },
        );
        Ok(())
    }

    /// Run one instruction. `fail_mint` is consumed by the first mint.
    pub fn execute(
        &mut self,
        instruction: &Instruction,
        payer: &Address,
        fail_mint: &mut Option<ProgramErrorCode>,
        skip_metadata: bool,
    ) -> Result<(), TransactionError> {
        if instruction.program_id != FAKE_PROGRAM_ID {
            return Err(rejected(format!(
                "ProgramAccountNotFound: {}",
                instruction.program_id
            )));
        }

        match instruction.data.first().copied() {
            Some(SETUP_TAG) => {
                let mint = account_at(instruction, 1)?;
                let token_account = account_at(instruction, 2)?;
                self.create(mint, TOKEN_PROGRAM_ID)?;
                self.create(token_account, TOKEN_PROGRAM_ID)
            }
            Some(MINT_TAG) => {
                if let Some(code) = fail_mint.take() {
                    return Err(program_error(code));
                }
                self.mint(instruction, payer, skip_metadata)
            }
            Some(PASS_TAG) => {
                let wallet = account_at(instruction, 0)?;
                let network = account_at(instruction, 1)?;
                self.expired_passes.remove(&(network, wallet));
                self.passes.insert((network, wallet));
                Ok(())
            }
            _ => Err(rejected("InvalidInstructionData")),
        }
    }

    fn mint(
        &mut self,
        instruction: &Instruction,
        payer: &Address,
        skip_metadata: bool,
    ) -> Result<(), TransactionError> {
        let machine_address = account_at(instruction, 0)?;
        let treasury = account_at(instruction, 2)?;
        let mint = account_at(instruction, 3)?;

        let machine_info = self
            .accounts
            .get(&machine_address)
            .ok_or_else(|| rejected(format!("AccountNotFound: {}", machine_address)))?;
        let mut machine = CandyMachineAccount::decode(&machine_info.data)
            .map_err(|e| rejected(e.to_string()))?;
        let mut discriminator = [0u8; DISCRIMINATOR_LEN];
        discriminator.copy_from_slice(&machine_info.data[..DISCRIMINATOR_LEN]);

        if !self.accounts.contains_key(&mint) {
            return Err(rejected(format!("Mint {} was not initialized", mint)));
        }

        if machine.items_redeemed >= machine.data.items_available {
            return Err(program_error(ProgramErrorCode::CANDY_MACHINE_EMPTY));
        }

        let allowlist = machine.data.whitelist_mint_settings;
        let allowlisted = allowlist
            .is_some_and(|settings| self.token_balance(payer, &settings.mint) > 0);
        let presale = allowlisted && allowlist.is_some_and(|settings| settings.presale);

        let now = ledger_now();
        let live = machine.data.go_live_date.is_some_and(|go_live| now >= go_live);
        if !live && !presale {
            return Err(program_error(ProgramErrorCode::CANDY_MACHINE_NOT_LIVE));
        }

        if let Some(gatekeeper) = machine.data.gatekeeper {
            let pass = (gatekeeper.gatekeeper_network, *payer);
            if !self.passes.contains(&pass) {
                return Err(program_error(GATEWAY_TOKEN_MISSING));
            }
            if gatekeeper.expire_on_use {
                self.passes.remove(&pass);
                self.expired_passes.insert(pass);
            }
        }

        let price = match allowlist {
            Some(settings) if allowlisted => settings.discount_price.unwrap_or(machine.data.price),
            _ => machine.data.price,
        };

        match machine.token_mint {
            Some(token_mint) => {
                let held = self.token_balance(payer, &token_mint);
                let rest = held
                    .checked_sub(price)
                    .ok_or_else(|| program_error(ProgramErrorCode::NOT_ENOUGH_FUNDS))?;
                self.token_balances.insert((*payer, token_mint), rest);
            }
            None => {
                let rest = self
                    .lamports(payer)
                    .checked_sub(Amount::from(price))
                    .ok_or_else(|| program_error(ProgramErrorCode::NOT_ENOUGH_FUNDS))?;
                if let Some(account) = self.accounts.get_mut(payer) {
                    account.lamports = rest;
                }
                self.credit(&treasury, Amount::from(price));
            }
        }

        if let Some(settings) = allowlist {
            if allowlisted && settings.mode == WhitelistMintMode::BurnEveryTime {
                let held = self.token_balance(payer, &settings.mint);
                self.token_balances
                    .insert((*payer, settings.mint), held.saturating_sub(1));
            }
        }

        if !skip_metadata {
            self.create(derive_address(METADATA_SEED, &mint), FAKE_PROGRAM_ID)?;
        }

        machine.items_redeemed += 1;
        let data = machine
            .encode(discriminator)
            .map_err(|e| rejected(e.to_string()))?;
        if let Some(info) = self.accounts.get_mut(&machine_address) {
            info.data = data;
        }

        Ok(())
    }
}
