//! `Account`: estado expuesto como campos (`balance` mutable, `owner` final).

use arena_core::model::{Fault, NativeArtifact, Value};

use super::int_arg;

#[derive(Debug, Clone, Default)]
pub struct AccountState {
    pub owner: String,
    pub balance: i64,
}

pub fn account() -> NativeArtifact<AccountState> {
    NativeArtifact::<AccountState>::builder("Account").constructor(&[], |_| Ok(AccountState::default()))
                                                      .constructor(&["java.lang.String"], |args| {
                                                          let owner = args.first().and_then(Value::as_str).unwrap_or_default();
                                                          Ok(AccountState { owner: owner.to_string(),
                                                                            balance: 0 })
                                                      })
                                                      .method("deposit", &["int"], "void", |s, args| {
                                                          s.balance += int_arg(args, 0)?;
                                                          Ok(Value::void())
                                                      })
                                                      .method("withdraw", &["int"], "void", |s, args| {
                                                          let amount = int_arg(args, 0)?;
                                                          if amount > s.balance {
                                                              return Err(Fault::illegal_argument(&format!("insufficient funds: {} < {amount}", s.balance)));
                                                          }
                                                          s.balance -= amount;
                                                          Ok(Value::void())
                                                      })
                                                      .field("balance",
                                                             "int",
                                                             |s| Value::int(s.balance),
                                                             |s, v| {
                                                                 s.balance = v.as_i64().ok_or_else(|| Fault::illegal_argument("balance must be an int"))?;
                                                                 Ok(())
                                                             })
                                                      .read_only_field("owner", "java.lang.String", |s| Value::string(s.owner.clone()))
                                                      .build()
}
