//! Deterministic project scaffolds written into a fresh workspace.
//!
//! Each variant materializes the minimal project its toolchain expects: the
//! submitted source verbatim, a build manifest parameterized with the
//! network endpoint, and the auxiliary files the toolchain reads. Credential
//! material is never written to disk; the generated manifests read it from
//! the environment at invoke time.

use std::path::{Path, PathBuf};

use slipway_core::{declared_identifier, ChainVariant, DeployRequest};

/// Fallback factory name when the source declares no contract.
const DEFAULT_CONTRACT_NAME: &str = "Contract";

/// Move package directory relative to the workspace root.
pub const MOVE_PACKAGE_DIR: &str = "contracts/counter";

/// The file set written into a workspace before the toolchain runs.
#[derive(Debug, Clone)]
pub struct Scaffold {
    files: Vec<(PathBuf, String)>,
}

impl Scaffold {
    /// Hardhat project around the submitted Solidity source.
    #[must_use]
    pub fn evm(request: &DeployRequest, rpc_url: &str) -> Self {
        let name = declared_identifier(&request.code).unwrap_or(DEFAULT_CONTRACT_NAME);
        let files = vec![
            (
                PathBuf::from(format!("contracts/{name}.sol")),
                request.code.clone(),
            ),
            (PathBuf::from("hardhat.config.ts"), hardhat_config(rpc_url)),
            (PathBuf::from("scripts/deploy.ts"), deploy_script(name)),
            (PathBuf::from("package.json"), package_json()),
            (PathBuf::from("tsconfig.json"), TSCONFIG.to_owned()),
        ];
        Self { files }
    }

    /// Aptos Move package around the submitted module source.
    #[must_use]
    pub fn move_package(request: &DeployRequest, _rpc_url: &str) -> Self {
        let address = request.target_address.as_deref().unwrap_or("_");
        let files = vec![
            (
                PathBuf::from(format!("{MOVE_PACKAGE_DIR}/sources/counter.move")),
                request.code.clone(),
            ),
            (
                PathBuf::from(format!("{MOVE_PACKAGE_DIR}/Move.toml")),
                move_manifest(address),
            ),
        ];
        Self { files }
    }

    /// The scaffold for a chain variant.
    #[must_use]
    pub fn for_variant(variant: ChainVariant, request: &DeployRequest, rpc_url: &str) -> Self {
        match variant {
            ChainVariant::Evm => Self::evm(request, rpc_url),
            ChainVariant::Move => Self::move_package(request, rpc_url),
        }
    }

    /// Relative path and contents of every scaffold file.
    pub fn files(&self) -> impl Iterator<Item = (&Path, &str)> + '_ {
        self.files.iter().map(|(path, contents)| (path.as_path(), contents.as_str()))
    }
}

fn hardhat_config(rpc_url: &str) -> String {
    format!(
        r#"import {{ HardhatUserConfig }} from "hardhat/config";
import "@nomicfoundation/hardhat-toolbox";
import '@moved/hardhat-plugin';

const config: HardhatUserConfig = {{
  solidity: "0.8.28",
  defaultNetwork: "devnet",
  networks: {{
    devnet: {{
      url: "{rpc_url}",
      accounts: [process.env.PRIVATE_KEY ?? ""]
    }}
  }}
}};

export default config;
"#
    )
}

fn deploy_script(name: &str) -> String {
    format!(
        r"import {{ ethers }} from 'hardhat';

async function main() {{
  const args = JSON.parse(process.env.CONSTRUCTOR_ARGS ?? '[]');
  const factory = await ethers.getContractFactory('{name}');
  const contract = await factory.deploy(...args, {{
    gasLimit: 3000000,
    gasPrice: ethers.parseUnits('0.1', 'gwei')
  }});
  await contract.waitForDeployment();

  // The receipt is authoritative for the assigned address.
  const receipt = await ethers.provider.getTransactionReceipt(contract.deploymentTransaction()?.hash!);
  console.log('{name} is deployed to:', receipt?.contractAddress);
  console.log('Deployment transaction hash:', contract.deploymentTransaction()?.hash);
}}

main()
  .then(() => process.exit(0))
  .catch((err) => {{
    console.error(err);
    process.exit(1);
  }});
"
    )
}

fn package_json() -> String {
    r#"{
  "name": "slipway-build",
  "version": "1.0.0",
  "private": true,
  "scripts": { "deploy": "npx hardhat run scripts/deploy.ts" },
  "devDependencies": {
    "hardhat": "^2.19.0",
    "@nomicfoundation/hardhat-toolbox": "^4.0.0",
    "@moved/hardhat-plugin": "^0.2.1",
    "typescript": "^5.0.0",
    "@types/node": "^20.0.0"
  }
}
"#
    .to_owned()
}

const TSCONFIG: &str = r#"{
  "compilerOptions": {
    "target": "es2020",
    "module": "commonjs",
    "strict": true,
    "esModuleInterop": true,
    "skipLibCheck": true,
    "forceConsistentCasingInFileNames": true,
    "resolveJsonModule": true
  }
}
"#;

fn move_manifest(address: &str) -> String {
    format!(
        r#"[package]
name = "counter"
version = "1.0.0"
authors = []

[addresses]
example = "{address}"

[dependencies.AptosFramework]
git = "https://github.com/aptos-labs/aptos-framework.git"
rev = "aptos-release-v1.27"
subdir = "aptos-framework"
"#
    )
}
