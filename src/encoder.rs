use anyhow::{Context, Result};
use ethers::abi::{self, Function, Param, ParamType, StateMutability, Token};
use ethers::types::{Address, Bytes, U256};

/// token_in(20) ‖ fee(3) ‖ token_out(20)
pub const SINGLE_HOP_PATH_LEN: usize = 43;

/// Encode a single-hop V3 path. The fee tier occupies three big-endian
/// bytes between the two addresses.
pub fn encode_path(token_in: Address, fee: u32, token_out: Address) -> Bytes {
    let mut path = Vec::with_capacity(SINGLE_HOP_PATH_LEN);
    path.extend_from_slice(token_in.as_bytes());
    path.extend_from_slice(&fee.to_be_bytes()[1..]);
    path.extend_from_slice(token_out.as_bytes());
    path.into()
}

/// Encode the V3_SWAP_EXACT_IN parameter tuple:
/// (recipient, amountIn, minAmountOut, path, payerIsUser).
///
/// `payer_is_user` must be false when the input token is the wrapped native
/// asset; the router then takes the attached transaction value instead of
/// pulling ERC-20 funds from the sender.
pub fn encode_v3_swap_exact_in(
    recipient: Address,
    amount_in: U256,
    min_amount_out: U256,
    path: &Bytes,
    payer_is_user: bool,
) -> Bytes {
    abi::encode(&[
        Token::Address(recipient),
        Token::Uint(amount_in),
        Token::Uint(min_amount_out),
        Token::Bytes(path.to_vec()),
        Token::Bool(payer_is_user),
    ])
    .into()
}

/// Wrap a single command and its encoded input in the Universal Router's
/// `execute(bytes commands, bytes[] inputs, uint256 deadline)` envelope.
#[allow(deprecated)]
pub fn encode_execute(command: u8, input: &Bytes, deadline: u64) -> Result<Bytes> {
    let execute = Function {
        name: "execute".to_string(),
        inputs: vec![
            Param {
                name: "commands".to_string(),
                kind: ParamType::Bytes,
                internal_type: None,
            },
            Param {
                name: "inputs".to_string(),
                kind: ParamType::Array(Box::new(ParamType::Bytes)),
                internal_type: None,
            },
            Param {
                name: "deadline".to_string(),
                kind: ParamType::Uint(256),
                internal_type: None,
            },
        ],
        outputs: vec![],
        constant: None,
        state_mutability: StateMutability::Payable,
    };

    let calldata = execute
        .encode_input(&[
            Token::Bytes(vec![command]),
            Token::Array(vec![Token::Bytes(input.to_vec())]),
            Token::Uint(deadline.into()),
        ])
        .context("failed to encode `execute` calldata")?;

    Ok(calldata.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::V3_SWAP_EXACT_IN;

    /// keccak256("execute(bytes,bytes[],uint256)")[..4]
    const EXECUTE_SELECTOR: [u8; 4] = [0x35, 0x93, 0x56, 0x4c];

    fn random_address() -> Address {
        Address::from(rand::random::<[u8; 20]>())
    }

    #[test]
    fn single_hop_path_is_always_43_bytes() {
        for _ in 0..32 {
            let path = encode_path(random_address(), rand::random::<u32>() >> 8, random_address());
            assert_eq!(path.len(), SINGLE_HOP_PATH_LEN);
        }
    }

    #[test]
    fn path_layout_is_token_in_fee_token_out() {
        let token_in = random_address();
        let token_out = random_address();

        let path = encode_path(token_in, 3000, token_out);

        assert_eq!(&path[..20], token_in.as_bytes());
        assert_eq!(&path[20..23], &[0x00, 0x0b, 0xb8]);
        assert_eq!(&path[23..], token_out.as_bytes());
    }

    #[test]
    fn swap_params_place_path_after_the_fixed_head() {
        let recipient = random_address();
        let path = encode_path(random_address(), 3000, random_address());

        let params = encode_v3_swap_exact_in(
            recipient,
            U256::from(10_500_000u64),
            U256::from(42u64),
            &path,
            true,
        );

        // Head: recipient, amountIn, minAmountOut, path offset, payerIsUser.
        assert_eq!(Address::from_slice(&params[12..32]), recipient);
        assert_eq!(
            U256::from_big_endian(&params[32..64]),
            U256::from(10_500_000u64)
        );
        assert_eq!(U256::from_big_endian(&params[64..96]), U256::from(42u64));
        assert_eq!(U256::from_big_endian(&params[96..128]), U256::from(0xa0));
        assert_eq!(U256::from_big_endian(&params[128..160]), U256::one());
        // Tail: path length word, then the 43 path bytes zero-padded.
        assert_eq!(
            U256::from_big_endian(&params[160..192]),
            U256::from(SINGLE_HOP_PATH_LEN)
        );
        assert_eq!(&params[192..235], &path[..]);
    }

    #[test]
    fn sepolia_usdc_to_weth_path_starts_with_usdc() {
        let usdc: Address = "0x1c7D4B196Cb0C7B01d743Fbc6116a902379C7238".parse().unwrap();
        let weth: Address = "0xfFf9976782d46CC05630D1f6eBAb18b2324d6B14".parse().unwrap();

        let path = encode_path(usdc, 3000, weth);

        assert_eq!(path.len(), SINGLE_HOP_PATH_LEN);
        assert_eq!(&path[..20], usdc.as_bytes());
    }

    #[test]
    fn payer_is_user_false_encodes_a_zero_word() {
        let path = encode_path(random_address(), 500, random_address());

        let params =
            encode_v3_swap_exact_in(random_address(), U256::one(), U256::one(), &path, false);

        assert_eq!(U256::from_big_endian(&params[128..160]), U256::zero());
    }

    #[test]
    fn execute_envelope_carries_selector_command_and_deadline() {
        let path = encode_path(random_address(), 3000, random_address());
        let input =
            encode_v3_swap_exact_in(random_address(), U256::one(), U256::one(), &path, true);

        let calldata = encode_execute(V3_SWAP_EXACT_IN, &input, 1_700_000_000).unwrap();

        assert_eq!(&calldata[..4], &EXECUTE_SELECTOR);

        let args = &calldata[4..];
        // Head: commands offset, inputs offset, deadline.
        assert_eq!(U256::from_big_endian(&args[0..32]), U256::from(0x60));
        assert_eq!(U256::from_big_endian(&args[32..64]), U256::from(0xa0));
        assert_eq!(
            U256::from_big_endian(&args[64..96]),
            U256::from(1_700_000_000u64)
        );
        // commands: one byte, zero-padded.
        assert_eq!(U256::from_big_endian(&args[96..128]), U256::one());
        assert_eq!(args[128], V3_SWAP_EXACT_IN);
        // inputs: one element whose bytes match the swap parameter tuple.
        let inputs_tail = &args[0xa0..];
        assert_eq!(U256::from_big_endian(&inputs_tail[0..32]), U256::one());
        assert_eq!(
            U256::from_big_endian(&inputs_tail[32..64]),
            U256::from(0x20)
        );
        assert_eq!(
            U256::from_big_endian(&inputs_tail[64..96]),
            U256::from(input.len())
        );
        assert_eq!(&inputs_tail[96..96 + input.len()], &input[..]);
    }
}
