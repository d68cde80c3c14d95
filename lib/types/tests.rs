#[cfg(test)]
mod transaction_tests {
    use crate::crypto::PrivateKey;
    use crate::sha256::Hash;
    use crate::test_helpers::{genesis_outpoint, output_to, signed_tx};
    use crate::types::{genesis_key, Blockchain, Transaction, TransactionInput, TransactionOutput};

    #[test]
    fn test_hash_is_stable_and_content_sensitive() {
        let chain = Blockchain::new();
        let key = genesis_key();
        let outpoint = genesis_outpoint(&chain);

        let tx = signed_tx(&key, &[outpoint.clone()], vec![output_to(&key.public_key(), 8)]);
        assert_eq!(tx.compute_hash(), tx.hash);

        let other = signed_tx(&key, &[outpoint], vec![output_to(&key.public_key(), 5)]);
        assert_ne!(tx.hash, other.hash);
    }

    #[test]
    fn test_hash_ignores_signatures() {
        let chain = Blockchain::new();
        let outpoint = genesis_outpoint(&chain);
        let outputs = vec![output_to(&genesis_key().public_key(), 8)];

        // same content signed by two different keys commits to the same hash
        let a = signed_tx(&genesis_key(), &[outpoint.clone()], outputs.clone());
        let b = signed_tx(&PrivateKey::new_key(), &[outpoint], outputs);
        assert_eq!(a.hash, b.hash);
    }

    #[test]
    fn test_coinbase_serialization_omits_inputs() {
        let coinbase = Transaction::coinbase(7, genesis_key().public_key(), 10);
        let value = serde_json::to_value(&coinbase).unwrap();
        assert!(value.get("inputs").is_none());
        assert!(value.get("outputs").is_some());

        let back: Transaction = serde_json::from_value(value).unwrap();
        assert!(back.is_coinbase());
        assert_eq!(back, coinbase);
    }

    #[test]
    fn test_coinbase_hash_depends_on_block_time() {
        let key = genesis_key().public_key();
        let a = Transaction::coinbase(1, key.clone(), 10);
        let b = Transaction::coinbase(2, key, 10);
        assert_ne!(a.hash, b.hash);
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let json = r#"{"outputs":[],"hash":"00","extra":1}"#;
        assert!(serde_json::from_str::<Transaction>(json).is_err());
    }

    #[test]
    fn test_output_check_enforces_dust_floor_and_key() {
        let good = output_to(&genesis_key().public_key(), 2);
        assert!(good.check().is_ok());

        let dust = output_to(&genesis_key().public_key(), 1);
        assert!(dust.check().is_err());

        let bad_key: TransactionOutput =
            serde_json::from_str(r#"{"publicKey":"02abcd","amount":5}"#).unwrap();
        assert!(bad_key.check().is_err());
    }

    #[test]
    fn test_input_structure_limits_index() {
        let chain = Blockchain::new();
        let key = genesis_key();
        let outpoint = genesis_outpoint(&chain);
        let tx = signed_tx(&key, &[outpoint], vec![output_to(&key.public_key(), 8)]);

        let mut input: TransactionInput = tx.inputs[0].clone();
        assert!(input.check_structure().is_ok());
        input.index = 2;
        assert!(input.check_structure().is_err());
        input.index = 0;
        input.hash = Hash::digest("some other confirmed transaction");
        assert!(input.check_structure().is_ok());
    }
}

#[cfg(test)]
mod block_tests {
    use crate::crypto::PrivateKey;
    use crate::error::CoinError;
    use crate::sha256::Hash;
    use crate::test_helpers::{genesis_outpoint, output_to, signed_tx};
    use crate::types::{genesis_key, Block, Blockchain, OutPoint, Transaction};

    #[test]
    fn test_push_tx_commits_block_and_utxos() {
        let chain = Blockchain::new();
        let key = genesis_key();
        let recipient = PrivateKey::new_key();
        let outpoint = genesis_outpoint(&chain);

        let tx = signed_tx(
            &key,
            &[outpoint.clone()],
            vec![output_to(&recipient.public_key(), 8)],
        );
        let tx_hash = tx.hash.clone();

        let mut utxos = chain.utxos().clone();
        let mut block = Block::empty(5);
        block.push_tx(tx, &mut utxos).unwrap();

        assert_eq!(block.txs.len(), 1);
        assert!(!utxos.contains(&outpoint));
        assert!(utxos.contains(&OutPoint {
            hash: tx_hash,
            index: 0
        }));
    }

    #[test]
    fn test_push_tx_rejects_missing_utxo() {
        let chain = Blockchain::new();
        let key = genesis_key();
        let phantom = OutPoint {
            hash: Hash::digest("never confirmed"),
            index: 0,
        };
        let tx = signed_tx(&key, &[phantom], vec![output_to(&key.public_key(), 8)]);

        let mut utxos = chain.utxos().clone();
        let mut block = Block::empty(5);
        assert!(block.push_tx(tx, &mut utxos).is_err());
        assert!(block.txs.is_empty());
        assert_eq!(&utxos, chain.utxos());
    }

    #[test]
    fn test_push_tx_rejects_intra_tx_double_spend() {
        let chain = Blockchain::new();
        let key = genesis_key();
        let outpoint = genesis_outpoint(&chain);
        // the same outpoint twice: 20 in on paper, but one UTXO
        let tx = signed_tx(
            &key,
            &[outpoint.clone(), outpoint],
            vec![output_to(&key.public_key(), 17)],
        );

        let mut utxos = chain.utxos().clone();
        let mut block = Block::empty(5);
        assert!(block.push_tx(tx, &mut utxos).is_err());
        assert_eq!(&utxos, chain.utxos());
    }

    #[test]
    fn test_push_tx_rejects_unbalanced_amounts() {
        let chain = Blockchain::new();
        let key = genesis_key();
        // 10 in requires 8 out; 9 leaves the fee unpaid
        let tx = signed_tx(
            &key,
            &[genesis_outpoint(&chain)],
            vec![output_to(&key.public_key(), 9)],
        );

        let mut utxos = chain.utxos().clone();
        let mut block = Block::empty(5);
        assert!(block.push_tx(tx, &mut utxos).is_err());
    }

    #[test]
    fn test_push_tx_rejects_dust_outputs() {
        let chain = Blockchain::new();
        let key = genesis_key();
        let tx = signed_tx(
            &key,
            &[genesis_outpoint(&chain)],
            vec![output_to(&key.public_key(), 1), output_to(&key.public_key(), 7)],
        );

        let mut utxos = chain.utxos().clone();
        let mut block = Block::empty(5);
        assert!(block.push_tx(tx, &mut utxos).is_err());
    }

    #[test]
    fn test_push_tx_rejects_foreign_signature() {
        let chain = Blockchain::new();
        // signed by a key that does not own the genesis output
        let intruder = PrivateKey::new_key();
        let tx = signed_tx(
            &intruder,
            &[genesis_outpoint(&chain)],
            vec![output_to(&intruder.public_key(), 8)],
        );

        let mut utxos = chain.utxos().clone();
        let mut block = Block::empty(5);
        assert!(matches!(
            block.push_tx(tx, &mut utxos),
            Err(CoinError::InvalidSignature)
        ));
        assert_eq!(&utxos, chain.utxos());
    }

    #[test]
    fn test_push_tx_rejects_tampered_hash() {
        let chain = Blockchain::new();
        let key = genesis_key();
        let mut tx = signed_tx(
            &key,
            &[genesis_outpoint(&chain)],
            vec![output_to(&key.public_key(), 8)],
        );
        tx.hash = Hash::digest("something else");

        let mut utxos = chain.utxos().clone();
        let mut block = Block::empty(5);
        assert!(block.push_tx(tx, &mut utxos).is_err());
    }

    #[test]
    fn test_push_coinbase_accepts_exact_reward() {
        let chain = Blockchain::new();
        let mut utxos = chain.utxos().clone();
        let mut block = Block::empty(5);

        let coinbase = Transaction::coinbase(5, genesis_key().public_key(), 10);
        block.push_coinbase(coinbase, &mut utxos).unwrap();
        assert_eq!(block.txs.len(), 1);
        assert_eq!(utxos.len(), 2);
    }

    #[test]
    fn test_push_coinbase_collects_fees() {
        let chain = Blockchain::new();
        let key = genesis_key();
        let mut utxos = chain.utxos().clone();
        let mut block = Block::empty(5);

        let tx = signed_tx(
            &key,
            &[genesis_outpoint(&chain)],
            vec![output_to(&key.public_key(), 8)],
        );
        block.push_tx(tx, &mut utxos).unwrap();

        // one input in the block: reward is 10 + 1
        let skimpy = Transaction::coinbase(5, key.public_key(), 10);
        assert!(block.push_coinbase(skimpy, &mut utxos).is_err());

        let exact = Transaction::coinbase(5, key.public_key(), 11);
        block.push_coinbase(exact, &mut utxos).unwrap();
    }

    #[test]
    fn test_push_coinbase_rejects_bad_shapes() {
        let chain = Blockchain::new();
        let key = genesis_key();
        let mut utxos = chain.utxos().clone();
        let mut block = Block::empty(5);

        // spending inputs is not a coinbase
        let spending = signed_tx(
            &key,
            &[genesis_outpoint(&chain)],
            vec![output_to(&key.public_key(), 8)],
        );
        assert!(block.push_coinbase(spending, &mut utxos).is_err());

        // two outputs is not a coinbase either
        let mut doubled = Transaction::coinbase(5, key.public_key(), 10);
        doubled.outputs.push(output_to(&key.public_key(), 2));
        assert!(block.push_coinbase(doubled, &mut utxos).is_err());
    }

    #[test]
    fn test_hash_covers_nonce_and_parent() {
        let chain = Blockchain::new();
        let mut block = Block::empty(5);
        block.txs.push(Transaction::coinbase(5, genesis_key().public_key(), 10));

        let parent = chain.tip().hash.clone();
        let base = block.compute_hash(Some(&parent));
        block.nonce = 1;
        assert_ne!(block.compute_hash(Some(&parent)), base);
        block.nonce = 0;
        assert_ne!(block.compute_hash(None), base);
    }
}

#[cfg(test)]
mod blockchain_tests {
    use crate::test_helpers::{genesis_outpoint, mine_block, output_to, signed_tx};
    use crate::types::{genesis_key, Blockchain, Transaction};
    use crate::util::now_secs;
    use std::cmp::Ordering;

    #[test]
    fn test_genesis_is_deterministic() {
        let a = Blockchain::new();
        let b = Blockchain::new();
        assert_eq!(a.blocks(), b.blocks());
        assert_eq!(a.block_height(), 1);
        assert_eq!(a.utxos().len(), 1);
        assert_eq!(a.utxos().balance(&genesis_key().public_key()), 10);
    }

    #[test]
    fn test_add_block_extends_chain_and_utxos() {
        let mut chain = Blockchain::new();
        let key = genesis_key();

        let tx = signed_tx(
            &key,
            &[genesis_outpoint(&chain)],
            vec![output_to(&key.public_key(), 8)],
        );
        let block = mine_block(&chain, vec![tx], 10, &key.public_key(), 0..257);
        chain.add_block(block).unwrap();

        assert_eq!(chain.block_height(), 2);
        // spent premine replaced by payment (8) and fee-bearing coinbase (11)
        assert_eq!(chain.utxos().len(), 2);
        let total: u64 = chain.utxos().iter().map(|(_, output)| output.amount).sum();
        assert_eq!(total, 19);
    }

    #[test]
    fn test_add_block_rejects_stale_and_future_timestamps() {
        let mut chain = Blockchain::new();
        let key = genesis_key().public_key();

        let stale = mine_block(&chain, vec![], 0, &key, 0..257);
        assert!(chain.add_block(stale).is_err());

        let future = mine_block(&chain, vec![], now_secs() + 100, &key, 0..257);
        assert!(chain.add_block(future).is_err());

        assert_eq!(chain.block_height(), 1);
    }

    #[test]
    fn test_add_block_rejects_tampered_nonce() {
        let mut chain = Blockchain::new();
        let mut block = mine_block(&chain, vec![], 10, &genesis_key().public_key(), 0..257);
        block.nonce += 1;
        assert!(chain.add_block(block).is_err());
    }

    #[test]
    fn test_add_block_rejects_wrong_coinbase_reward() {
        let mut chain = Blockchain::new();
        let key = genesis_key().public_key();

        // structurally fine, but mints one unit too many
        let fees = 0;
        let mut block = crate::types::Block {
            time: 10,
            txs: vec![Transaction::coinbase(10, key, 10 + fees + 1)],
            nonce: 0,
            hash: crate::sha256::Hash::zero(),
        };
        block.hash = block.compute_hash(Some(&chain.tip().hash));
        assert!(chain.add_block(block).is_err());
    }

    #[test]
    fn test_add_block_enforces_required_difficulty() {
        let mut chain = Blockchain::new();
        let key = genesis_key().public_key();

        // two one-second intervals push the requirement to two bits
        let first = mine_block(&chain, vec![], 1, &key, 0..257);
        chain.add_block(first).unwrap();
        let second = mine_block(&chain, vec![], 2, &key, 1..257);
        chain.add_block(second).unwrap();
        assert_eq!(chain.next_difficulty(), 2);

        let weak = mine_block(&chain, vec![], 3, &key, 0..2);
        assert!(chain.add_block(weak).is_err());

        let strong = mine_block(&chain, vec![], 4, &key, 2..257);
        chain.add_block(strong).unwrap();
    }

    #[test]
    fn test_try_swap_adopts_strictly_heavier_chain() {
        let key = genesis_key().public_key();

        // light fork: every block below four bits of difficulty
        let mut ours = Blockchain::new();
        for time in [10, 20] {
            let block = mine_block(&ours, vec![], time, &key, 0..4);
            ours.add_block(block).unwrap();
        }

        // heavy fork of the same length: at least five bits each
        let mut theirs = Blockchain::new();
        for time in [11, 21] {
            let block = mine_block(&theirs, vec![], time, &key, 5..257);
            theirs.add_block(block).unwrap();
        }
        assert!(theirs.work() > ours.work());

        let ordering = ours.try_swap(theirs.blocks().to_vec()).unwrap();
        assert_eq!(ordering, Ordering::Greater);
        assert_eq!(ours.blocks(), theirs.blocks());
        assert_eq!(ours.utxos(), theirs.utxos());
    }

    #[test]
    fn test_try_swap_ignores_equal_work() {
        let mut chain = Blockchain::new();
        let block = mine_block(&chain, vec![], 10, &genesis_key().public_key(), 0..257);
        chain.add_block(block).unwrap();

        let snapshot = chain.blocks().to_vec();
        let ordering = chain.try_swap(snapshot.clone()).unwrap();
        assert_eq!(ordering, Ordering::Equal);
        assert_eq!(chain.blocks(), snapshot.as_slice());
    }

    #[test]
    fn test_try_swap_reports_lighter_chains_without_mutation() {
        let key = genesis_key().public_key();

        let mut heavy = Blockchain::new();
        let block = mine_block(&heavy, vec![], 10, &key, 5..257);
        heavy.add_block(block).unwrap();

        let mut light = Blockchain::new();
        let block = mine_block(&light, vec![], 10, &key, 0..4);
        light.add_block(block).unwrap();

        let snapshot = heavy.blocks().to_vec();
        let ordering = heavy.try_swap(light.blocks().to_vec()).unwrap();
        assert_eq!(ordering, Ordering::Less);
        assert_eq!(heavy.blocks(), snapshot.as_slice());
    }

    #[test]
    fn test_try_swap_rejects_invalid_candidates() {
        let key = genesis_key().public_key();

        let mut other = Blockchain::new();
        let block = mine_block(&other, vec![], 10, &key, 0..257);
        other.add_block(block).unwrap();

        let mut candidate = other.blocks().to_vec();
        candidate[1].nonce += 1;

        let mut chain = Blockchain::new();
        assert!(chain.try_swap(candidate).is_err());
        assert_eq!(chain.block_height(), 1);
    }
}

#[cfg(test)]
mod pool_tests {
    use crate::test_helpers::{genesis_outpoint, mine_block, output_to, signed_tx};
    use crate::types::{genesis_key, Blockchain, Mempool, OutPoint};
    use crate::wallet::Wallet;

    #[test]
    fn test_add_tx_accepts_a_valid_transaction() {
        let chain = Blockchain::new();
        let wallet = Wallet::from_key(genesis_key());
        let recipient = Wallet::new();
        let tx = wallet
            .make_tx(5, &recipient.public_key(), chain.utxos())
            .unwrap();

        let mut pool = Mempool::new();
        assert!(pool.add_tx(tx, chain.utxos()).unwrap());
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_add_tx_silently_refuses_a_second_claim() {
        let chain = Blockchain::new();
        let key = genesis_key();
        let outpoint = genesis_outpoint(&chain);

        let first = signed_tx(&key, &[outpoint.clone()], vec![output_to(&key.public_key(), 8)]);
        let second = signed_tx(
            &key,
            &[outpoint],
            vec![output_to(&key.public_key(), 5), output_to(&key.public_key(), 3)],
        );

        let mut pool = Mempool::new();
        assert!(pool.add_tx(first.clone(), chain.utxos()).unwrap());
        assert!(!pool.add_tx(second, chain.utxos()).unwrap());
        assert_eq!(pool.txs(), &[first]);
    }

    #[test]
    fn test_add_tx_surfaces_validation_failures() {
        let chain = Blockchain::new();
        let key = genesis_key();
        // unbalanced: leaves the fee unpaid
        let tx = signed_tx(
            &key,
            &[genesis_outpoint(&chain)],
            vec![output_to(&key.public_key(), 9)],
        );

        let mut pool = Mempool::new();
        assert!(pool.add_tx(tx, chain.utxos()).is_err());
        assert!(pool.is_empty());
    }

    #[test]
    fn test_add_tx_rejects_spending_unconfirmed_change() {
        let chain = Blockchain::new();
        let wallet = Wallet::from_key(genesis_key());
        let recipient = Wallet::new();

        let parent = wallet
            .make_tx(5, &recipient.public_key(), chain.utxos())
            .unwrap();
        let change = OutPoint {
            hash: parent.hash.clone(),
            index: 1,
        };

        let mut pool = Mempool::new();
        assert!(pool.add_tx(parent, chain.utxos()).unwrap());

        // the change output exists only inside the pool, not in the
        // confirmed set, so a child spending it cannot be admitted yet
        let child = signed_tx(
            &genesis_key(),
            &[change],
            vec![output_to(&wallet.public_key(), 2)],
        );
        assert!(pool.add_tx(child, chain.utxos()).is_err());
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_find_tx_index_locates_claims() {
        let chain = Blockchain::new();
        let wallet = Wallet::from_key(genesis_key());
        let recipient = Wallet::new();
        let tx = wallet
            .make_tx(5, &recipient.public_key(), chain.utxos())
            .unwrap();
        let outpoint = genesis_outpoint(&chain);

        let mut pool = Mempool::new();
        pool.add_tx(tx, chain.utxos()).unwrap();

        assert_eq!(pool.find_tx_index(&outpoint), Some(0));
        let elsewhere = OutPoint {
            hash: crate::sha256::Hash::digest("elsewhere"),
            index: 0,
        };
        assert_eq!(pool.find_tx_index(&elsewhere), None);
    }

    #[test]
    fn test_remove_block_txs_evicts_confirmed_spenders() {
        let mut chain = Blockchain::new();
        let wallet = Wallet::from_key(genesis_key());
        let recipient = Wallet::new();
        let tx = wallet
            .make_tx(5, &recipient.public_key(), chain.utxos())
            .unwrap();

        let mut pool = Mempool::new();
        pool.add_tx(tx.clone(), chain.utxos()).unwrap();

        let block = mine_block(&chain, vec![tx], 10, &wallet.public_key(), 0..257);
        chain.add_block(block.clone()).unwrap();
        pool.remove_block_txs(&block);

        assert!(pool.is_empty());
        // idempotent on a second pass
        pool.remove_block_txs(&block);
        assert!(pool.is_empty());
    }

    #[test]
    fn test_remove_block_txs_releases_all_claims_of_multi_input_entries() {
        let mut chain = Blockchain::new();
        let key = genesis_key();

        // a second premine-sized output to the same key
        let extra = mine_block(&chain, vec![], 10, &key.public_key(), 0..257);
        chain.add_block(extra).unwrap();
        let coinbase_outpoint = OutPoint {
            hash: chain.tip().txs[0].hash.clone(),
            index: 0,
        };
        let premine_outpoint = genesis_outpoint(&chain);

        // pool entry spending both outputs at once
        let wide = signed_tx(
            &key,
            &[premine_outpoint.clone(), coinbase_outpoint.clone()],
            vec![output_to(&key.public_key(), 17)],
        );
        let mut pool = Mempool::new();
        assert!(pool.add_tx(wide, chain.utxos()).unwrap());

        // a block confirms a competing spend of just the premine output
        let rival = signed_tx(&key, &[premine_outpoint], vec![output_to(&key.public_key(), 8)]);
        let block = mine_block(&chain, vec![rival], 20, &key.public_key(), 0..257);
        pool.remove_block_txs(&block);
        assert!(pool.is_empty());

        // the untouched claim was released along with the evicted entry
        let narrow = signed_tx(&key, &[coinbase_outpoint], vec![output_to(&key.public_key(), 8)]);
        assert!(pool.add_tx(narrow, chain.utxos()).unwrap());
    }

    #[test]
    fn test_clear_empties_everything() {
        let chain = Blockchain::new();
        let wallet = Wallet::from_key(genesis_key());
        let recipient = Wallet::new();
        let tx = wallet
            .make_tx(5, &recipient.public_key(), chain.utxos())
            .unwrap();

        let mut pool = Mempool::new();
        pool.add_tx(tx.clone(), chain.utxos()).unwrap();
        pool.clear();
        assert!(pool.is_empty());

        // cleared claims are genuinely gone
        assert!(pool.add_tx(tx, chain.utxos()).unwrap());
    }
}
