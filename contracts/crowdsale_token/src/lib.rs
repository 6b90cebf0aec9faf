#![cfg_attr(not(feature = "std"), no_std, no_main)]

/// # Meridian Token — Crowdsale Ledger
///
/// **Role:** fixed-supply token ledger fused with the sale gate that
/// distributes it.  One contract keeps both concerns because they share the
/// same invariants: the sale reserve *is* a ledger balance, and the
/// open/closed decision gates every balance movement.
///
/// ## Sale lifecycle
///
/// ```text
///          start                      start + 4 weeks
///            │                               │
///  NOT OPEN  │  OPEN (+50% bonus, 7 days)    │  OPEN while raised < min cap
///  ──────────┼───────────────────────────────┼────────────────────────────►
///            │                               │
///  purchases rejected      purchases minted at 50 units per native unit
///  transfers locked        transfers locked
///
///  CLOSED (terminal) when:  raised ≥ max cap
///                       or  now ≥ start + 4 weeks  AND  raised ≥ min cap
///
///  After closing: purchases rejected, holder-to-holder transfers unlocked.
/// ```
///
/// There is no hard close at the 4-week mark: below the minimum cap the sale
/// stays open until a later purchase satisfies it (or the maximum is hit).
/// The purchase that crosses either cap is honoured in full — only the next
/// one observes the closed state.
///
/// Every payment is forwarded to the funds wallet inside the same call; the
/// contract never custodies native value.
#[ink::contract]
mod crowdsale_token {
    use ink::prelude::string::String;
    use ink::storage::Mapping;

    // =========================================================================
    // CONSTANTS
    // =========================================================================

    /// Base units per whole token — 18 decimals, matching the native coin.
    pub const ONE_TOKEN: u128 = 1_000_000_000_000_000_000;

    /// Fixed supply: 1 000 000 whole tokens, minted once at deployment to the
    /// funds wallet.  Never minted again, never burned.
    pub const TOTAL_SUPPLY: u128 = 1_000_000 * ONE_TOKEN;

    /// Flat sale rate: token base units minted per native base unit.
    pub const SALE_RATE: u128 = 50;

    /// Rate inside the first-week bonus window: 50 × 1.5, exact in integers.
    pub const BONUS_RATE: u128 = 75;

    /// Nominal sale window: 4 weeks, in seconds.
    pub const SALE_DURATION_SECONDS: u64 = 2_419_200; // 4 * 7 * 24 * 60 * 60

    /// Early-bird bonus window: the first 7 days from `start_timestamp`.
    pub const BONUS_WINDOW_SECONDS: u64 = 604_800; // 7 * 24 * 60 * 60

    /// Block timestamps are milliseconds; the sale clock runs in Unix seconds.
    pub const MILLIS_PER_SECOND: u64 = 1_000;

    pub const TOKEN_NAME: &str = "Meridian Token";
    pub const TOKEN_SYMBOL: &str = "MRD";
    pub const DECIMALS: u8 = 18;

    // =========================================================================
    // STORAGE
    // =========================================================================

    #[ink(storage)]
    pub struct CrowdsaleToken {
        // ── Token metadata ────────────────────────────────────────────────
        name: String,
        symbol: String,
        decimals: u8,
        total_supply: Balance,

        // ── Ledger ────────────────────────────────────────────────────────
        balances: Mapping<AccountId, Balance>,
        allowances: Mapping<(AccountId, AccountId), Balance>,

        // ── Sale configuration (immutable after construction) ─────────────
        /// Receives the whole supply at deployment and every forwarded
        /// payment; the sale reserve is debited from its balance.
        funds_wallet: AccountId,
        /// Unix seconds at which the sale opens.
        start_timestamp: Timestamp,
        /// Minimum raise, in native base units.  Until it is met the sale
        /// cannot close on time alone.
        min_cap: Balance,
        /// Maximum raise, in native base units.  Reaching it closes the sale
        /// regardless of time.
        max_cap: Balance,

        // ── Sale progress ─────────────────────────────────────────────────
        /// Native value accepted across all successful purchases.
        /// Monotonically non-decreasing.
        total_raised: Balance,
    }

    // =========================================================================
    // EVENTS
    // =========================================================================

    #[ink(event)]
    pub struct Transfer {
        #[ink(topic)]
        from: Option<AccountId>,
        #[ink(topic)]
        to: Option<AccountId>,
        value: Balance,
    }

    #[ink(event)]
    pub struct Approval {
        #[ink(topic)]
        owner: AccountId,
        #[ink(topic)]
        spender: AccountId,
        value: Balance,
    }

    // =========================================================================
    // ERRORS
    // =========================================================================

    #[derive(Debug, PartialEq, Eq, scale::Encode, scale::Decode)]
    #[cfg_attr(feature = "std", derive(scale_info::TypeInfo))]
    pub enum Error {
        /// Purchase attempted before the start timestamp or after the sale
        /// closed.
        SaleNotActive,
        /// Token transfers are locked until the sale has closed.
        TransfersLocked,
        /// Source balance (or the sale reserve) cannot cover the amount.
        InsufficientBalance,
        /// Spender allowance cannot cover the amount.
        InsufficientAllowance,
        /// The funds wallet must not be the zero account.
        InvalidFundsWallet,
        /// `min_cap` must not exceed `max_cap`.
        InvalidCaps,
        /// An arithmetic operation overflowed.
        Overflow,
        /// Forwarding native value to the funds wallet failed.
        TransferFailed,
    }

    // =========================================================================
    // IMPLEMENTATION
    // =========================================================================

    impl CrowdsaleToken {
        // ---------------------------------------------------------------------
        // Constructor
        // ---------------------------------------------------------------------

        /// Deploy the crowdsale ledger.
        ///
        /// Mints the entire fixed supply to `funds_wallet`, which doubles as
        /// the sale reserve.  The configuration quadruple is immutable for
        /// the lifetime of the contract.
        ///
        /// # Errors
        /// - [`Error::InvalidFundsWallet`] — `funds_wallet` is the zero account.
        /// - [`Error::InvalidCaps`]        — `min_cap` exceeds `max_cap`.
        #[ink(constructor)]
        pub fn new(
            funds_wallet: AccountId,
            start_timestamp: Timestamp,
            min_cap: Balance,
            max_cap: Balance,
        ) -> Result<Self, Error> {
            if funds_wallet == AccountId::from([0u8; 32]) {
                return Err(Error::InvalidFundsWallet);
            }
            if min_cap > max_cap {
                return Err(Error::InvalidCaps);
            }

            let mut balances = Mapping::default();
            balances.insert(funds_wallet, &TOTAL_SUPPLY);

            Self::env().emit_event(Transfer {
                from: None,
                to: Some(funds_wallet),
                value: TOTAL_SUPPLY,
            });

            Ok(Self {
                name: String::from(TOKEN_NAME),
                symbol: String::from(TOKEN_SYMBOL),
                decimals: DECIMALS,
                total_supply: TOTAL_SUPPLY,
                balances,
                allowances: Mapping::default(),
                funds_wallet,
                start_timestamp,
                min_cap,
                max_cap,
                total_raised: 0,
            })
        }

        // =====================================================================
        // THE GATE — Purchase
        // =====================================================================

        /// Buy tokens by sending native value with the call.
        ///
        /// ```text
        /// amount = value × 75   while now < start + 7 days   (+50% bonus)
        /// amount = value × 50   afterwards
        /// ```
        ///
        /// The minted amount is debited from the funds-wallet reserve and the
        /// full payment is forwarded to the funds wallet in the same call.  A
        /// purchase either fully succeeds or fully fails — there is no
        /// clipping at the maximum cap, so the crossing purchase may
        /// overshoot it arbitrarily.
        ///
        /// # Errors
        /// - [`Error::SaleNotActive`]       — before start, or sale closed.
        /// - [`Error::InsufficientBalance`] — the reserve cannot cover the amount.
        /// - [`Error::Overflow`]            — amount or raised-total overflowed.
        /// - [`Error::TransferFailed`]      — the native forward was refused.
        #[ink(message, payable)]
        pub fn purchase(&mut self) -> Result<Balance, Error> {
            let buyer = self.env().caller();
            let value = self.env().transferred_value();
            let now = self.now_seconds();

            if !self.is_open_at(now) {
                return Err(Error::SaleNotActive);
            }

            let amount = value.checked_mul(self.rate_at(now)).ok_or(Error::Overflow)?;
            let raised = self.total_raised.checked_add(value).ok_or(Error::Overflow)?;

            // ── State update (before the native forward) ──────────────────
            self.debit_balance(self.funds_wallet, amount)?;
            self.credit_balance(buyer, amount)?;
            self.total_raised = raised;

            // Forward the whole payment; the contract holds no escrow.
            self.env()
                .transfer(self.funds_wallet, value)
                .map_err(|_| Error::TransferFailed)?;

            self.env().emit_event(Transfer {
                from: Some(self.funds_wallet),
                to: Some(buyer),
                value: amount,
            });

            Ok(amount)
        }

        // =====================================================================
        // TOKEN INTERFACE — transfers unlocked once the sale has closed
        // =====================================================================

        #[ink(message)]
        pub fn transfer(&mut self, to: AccountId, value: Balance) -> Result<(), Error> {
            self.ensure_sale_closed()?;
            let from = self.env().caller();
            self.transfer_impl(from, to, value)
        }

        #[ink(message)]
        pub fn transfer_from(
            &mut self,
            from: AccountId,
            to: AccountId,
            value: Balance,
        ) -> Result<(), Error> {
            self.ensure_sale_closed()?;
            let caller = self.env().caller();
            let current_allowance = self.allowance(from, caller);
            if current_allowance < value {
                return Err(Error::InsufficientAllowance);
            }
            self.allowances
                .insert((from, caller), &current_allowance.saturating_sub(value));
            self.transfer_impl(from, to, value)
        }

        /// Set the allowance for `(caller, spender)`.  Replaces any previous
        /// value outright and carries no sale-state precondition — only the
        /// spend itself is gated.
        #[ink(message)]
        pub fn approve(&mut self, spender: AccountId, value: Balance) -> Result<(), Error> {
            let owner = self.env().caller();
            self.allowances.insert((owner, spender), &value);
            self.env().emit_event(Approval { owner, spender, value });
            Ok(())
        }

        // =====================================================================
        // VIEW FUNCTIONS
        // =====================================================================

        #[ink(message)]
        pub fn total_supply(&self) -> Balance { self.total_supply }

        #[ink(message)]
        pub fn balance_of(&self, owner: AccountId) -> Balance {
            self.balances.get(owner).unwrap_or(0)
        }

        #[ink(message)]
        pub fn allowance(&self, owner: AccountId, spender: AccountId) -> Balance {
            self.allowances.get((owner, spender)).unwrap_or(0)
        }

        #[ink(message)]
        pub fn name(&self) -> String { self.name.clone() }

        #[ink(message)]
        pub fn symbol(&self) -> String { self.symbol.clone() }

        #[ink(message)]
        pub fn decimals(&self) -> u8 { self.decimals }

        #[ink(message)]
        pub fn funds_wallet(&self) -> AccountId { self.funds_wallet }

        #[ink(message)]
        pub fn start_timestamp(&self) -> Timestamp { self.start_timestamp }

        /// Nominal sale window in seconds (4 weeks).  The actual close may be
        /// earlier (max cap) or later (minimum not yet met).
        #[ink(message)]
        pub fn duration_seconds(&self) -> Timestamp { SALE_DURATION_SECONDS }

        #[ink(message)]
        pub fn min_cap(&self) -> Balance { self.min_cap }

        #[ink(message)]
        pub fn max_cap(&self) -> Balance { self.max_cap }

        #[ink(message)]
        pub fn total_raised(&self) -> Balance { self.total_raised }

        /// Returns `true` while purchases are being accepted.
        #[ink(message)]
        pub fn is_sale_open(&self) -> bool {
            self.is_open_at(self.now_seconds())
        }

        /// Previews the token amount a payment of `value` would mint right
        /// now, applying the same rate and bonus-window rule as [`purchase`]
        /// without touching state.  Saturates instead of failing.
        #[ink(message)]
        pub fn calculate_token_amount(&self, value: Balance) -> Balance {
            value.saturating_mul(self.rate_at(self.now_seconds()))
        }

        // =====================================================================
        // INTERNAL HELPERS
        // =====================================================================

        /// Samples the sale clock, once per message.
        fn now_seconds(&self) -> Timestamp {
            self.env().block_timestamp() / MILLIS_PER_SECOND
        }

        /// CLOSED test at `now`.  Both inputs (`total_raised`, time) are
        /// monotone, so a closed sale can never reopen.
        fn is_closed_at(&self, now: Timestamp) -> bool {
            if self.total_raised >= self.max_cap {
                return true;
            }
            let nominal_end = self.start_timestamp.saturating_add(SALE_DURATION_SECONDS);
            now >= nominal_end && self.total_raised >= self.min_cap
        }

        fn is_open_at(&self, now: Timestamp) -> bool {
            now >= self.start_timestamp && !self.is_closed_at(now)
        }

        /// Token units per native base unit at `now`.  The bonus window is
        /// the first 7 days from start, independent of the cap state.
        fn rate_at(&self, now: Timestamp) -> Balance {
            let bonus_end = self.start_timestamp.saturating_add(BONUS_WINDOW_SECONDS);
            if now < bonus_end { BONUS_RATE } else { SALE_RATE }
        }

        fn ensure_sale_closed(&self) -> Result<(), Error> {
            if !self.is_closed_at(self.now_seconds()) {
                return Err(Error::TransfersLocked);
            }
            Ok(())
        }

        fn transfer_impl(&mut self, from: AccountId, to: AccountId, value: Balance) -> Result<(), Error> {
            self.debit_balance(from, value)?;
            self.credit_balance(to, value)?;
            self.env().emit_event(Transfer {
                from: Some(from),
                to: Some(to),
                value,
            });
            Ok(())
        }

        fn debit_balance(&mut self, account: AccountId, amount: Balance) -> Result<(), Error> {
            let balance = self.balances.get(account).unwrap_or(0);
            if balance < amount {
                return Err(Error::InsufficientBalance);
            }
            self.balances.insert(account, &(balance - amount));
            Ok(())
        }

        fn credit_balance(&mut self, account: AccountId, amount: Balance) -> Result<(), Error> {
            let balance = self.balances.get(account).unwrap_or(0);
            let new_balance = balance.checked_add(amount).ok_or(Error::Overflow)?;
            self.balances.insert(account, &new_balance);
            Ok(())
        }
    }

    // =========================================================================
    // UNIT TESTS
    // =========================================================================

}
