//! Lua encoding of a guarded [`WriteBatch`].
//!
//! Redis runs a script without interleaving other clients' commands, which
//! gives the guard check and the writes a single atomic step.
//!
//! Layout: `KEYS` holds the guard keys followed by one key per command.
//! `ARGV[1]` is the guard count, then one field per guard, then per command
//! either `hset, field, value` or `lpush, value`.

use crate::domain::ports::{BatchGuard, WriteBatch, WriteCommand};

/// Script returning 1 when applied and 0 when a guard fails.
///
/// Key types are checked before the first write, including the types staged
/// by earlier commands in the batch, so a type clash aborts the batch with
/// nothing applied.
pub(super) const BATCH_SCRIPT: &str = r"
local guards = tonumber(ARGV[1])
for i = 1, guards do
  if redis.call('HEXISTS', KEYS[i], ARGV[i + 1]) == 1 then
    return 0
  end
end
local staged = {}
local arg = guards + 2
for i = guards + 1, #KEYS do
  local expected = 'list'
  if ARGV[arg] == 'hset' then
    expected = 'hash'
    arg = arg + 3
  else
    arg = arg + 2
  end
  local actual = staged[KEYS[i]]
  if actual == nil then
    actual = redis.call('TYPE', KEYS[i]).ok
  end
  if actual ~= 'none' and actual ~= expected then
    return redis.error_reply('WRONGTYPE ' .. KEYS[i] .. ' holds a ' .. actual)
  end
  staged[KEYS[i]] = expected
end
arg = guards + 2
for i = guards + 1, #KEYS do
  if ARGV[arg] == 'hset' then
    redis.call('HSET', KEYS[i], ARGV[arg + 1], ARGV[arg + 2])
    arg = arg + 3
  else
    redis.call('LPUSH', KEYS[i], ARGV[arg + 1])
    arg = arg + 2
  end
end
return 1
";

const HSET: &[u8] = b"hset";
const LPUSH: &[u8] = b"lpush";

/// Keys and arguments for one `EVAL` of [`BATCH_SCRIPT`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct EncodedBatch {
    pub(super) keys: Vec<String>,
    pub(super) args: Vec<Vec<u8>>,
}

pub(super) fn encode_batch(batch: &WriteBatch) -> EncodedBatch {
    let mut keys = Vec::with_capacity(batch.guards().len() + batch.commands().len());
    let mut args = vec![batch.guards().len().to_string().into_bytes()];

    for guard in batch.guards() {
        match guard {
            BatchGuard::FieldAbsent { key, field } => {
                keys.push(key.as_str().to_owned());
                args.push(field.clone().into_bytes());
            }
        }
    }
    for command in batch.commands() {
        match command {
            WriteCommand::HashSet { key, field, value } => {
                keys.push(key.as_str().to_owned());
                args.push(HSET.to_vec());
                args.push(field.clone().into_bytes());
                args.push(value.clone());
            }
            WriteCommand::ListPush { key, value } => {
                keys.push(key.as_str().to_owned());
                args.push(LPUSH.to_vec());
                args.push(value.clone());
            }
        }
    }

    EncodedBatch { keys, args }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::StoreKey;
    use crate::domain::{UpdateId, UserId};
    use rstest::rstest;

    fn bytes(raw: &str) -> Vec<u8> {
        raw.as_bytes().to_vec()
    }

    #[rstest]
    fn guards_precede_commands() {
        let user = UserId::new(1).expect("valid id");
        let mut batch = WriteBatch::new();
        batch
            .require_field_absent(StoreKey::username_index(), "alice")
            .hash_set(StoreKey::username_index(), "alice", bytes("1"))
            .hash_set(StoreKey::user_record(user), "username", bytes("alice"));

        let encoded = encode_batch(&batch);
        assert_eq!(
            encoded.keys,
            vec!["user:by-username", "user:by-username", "user:1"]
        );
        assert_eq!(
            encoded.args,
            vec![
                bytes("1"),
                bytes("alice"),
                bytes("hset"),
                bytes("alice"),
                bytes("1"),
                bytes("hset"),
                bytes("username"),
                bytes("alice"),
            ]
        );
    }

    #[rstest]
    fn unguarded_pushes_carry_only_values() {
        let update = UpdateId::new(7).expect("valid id");
        let mut batch = WriteBatch::new();
        batch.list_push(StoreKey::global_feed(), update.to_string().into_bytes());

        let encoded = encode_batch(&batch);
        assert_eq!(encoded.keys, vec!["updates"]);
        assert_eq!(encoded.args, vec![bytes("0"), bytes("lpush"), bytes("7")]);
    }

    #[rstest]
    fn binary_values_pass_through_unchanged() {
        let user = UserId::new(2).expect("valid id");
        let raw = vec![0_u8, 159, 255];
        let mut batch = WriteBatch::new();
        batch.hash_set(StoreKey::user_record(user), "hash", raw.clone());

        let encoded = encode_batch(&batch);
        assert_eq!(encoded.args.last(), Some(&raw));
    }
}
