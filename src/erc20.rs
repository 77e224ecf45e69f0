alloy::sol! {
    #[sol(rpc)]
    contract ERC20 {
        function approve(address spender, uint256 amount) returns (bool);
        function allowance(address owner, address spender) view returns (uint256);
    }

    #[sol(rpc)]
    contract TokenLaunchpad {
        function launch(
            address token,
            uint256 tokenAmount,
            uint256 amountTokenMin,
            uint256 amountEthMin,
            uint256 deadline
        ) payable returns (address pair);
    }
}
