use crate::cmd::{
    connect::{ConnectArgs, DisconnectArgs},
    issue::IssueArgs,
    issuer::{AddIssuerArgs, AdminArgs, IsIssuerArgs, RoleArgs},
    mirror::MirrorSubcommand,
    revoke::RevokeArgs,
    verify::VerifyArgs,
};
use clap::{Parser, Subcommand};

/// Issue and verify course certificates on an on-chain registry.
#[derive(Parser)]
#[command(name = "certify", version, next_display_order = None)]
pub struct Certify {
    #[command(subcommand)]
    pub cmd: CertifySubcommand,
}

#[derive(Subcommand)]
pub enum CertifySubcommand {
    /// Connects the wallet and prints the active account.
    #[command(visible_alias = "whoami")]
    Connect(ConnectArgs),

    /// Forgets the active account.
    ///
    /// Only the local session is cleared; the wallet keeps its authorization.
    Disconnect(DisconnectArgs),

    /// Issues a certificate from the connected account.
    #[command(visible_alias = "i")]
    Issue(IssueArgs),

    /// Looks up a certificate by ID.
    #[command(visible_alias = "v")]
    Verify(VerifyArgs),

    /// Revokes a certificate.
    Revoke(RevokeArgs),

    /// Authorizes an account to issue certificates. Admin only.
    AddIssuer(AddIssuerArgs),

    /// Prints the registry admin.
    Admin(AdminArgs),

    /// Checks whether an account is an authorized issuer.
    IsIssuer(IsIssuerArgs),

    /// Prints the role of the connected account.
    Role(RoleArgs),

    /// Certificate mirror commands.
    #[command(subcommand)]
    Mirror(MirrorSubcommand),
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Certify::command().debug_assert();
    }

    #[test]
    fn parse_issue() {
        let args = Certify::parse_from([
            "certify",
            "issue",
            "CERT-001",
            "Ada Lovelace",
            "Analytical Engines",
            "QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG",
            "--async",
            "--chain",
            "sepolia",
        ]);
        let CertifySubcommand::Issue(issue) = args.cmd else { panic!("expected issue") };
        assert_eq!(issue.certificate_id, "CERT-001");
        assert_eq!(issue.student_name, "Ada Lovelace");
        assert!(issue.send_async);
        assert_eq!(issue.registry.chain.map(|c| c.id()), Some(11155111));
    }

    #[test]
    fn parse_aliases() {
        let args = Certify::parse_from(["certify", "whoami", "--json"]);
        assert!(matches!(args.cmd, CertifySubcommand::Connect(ConnectArgs { json: true, .. })));

        let args = Certify::parse_from(["certify", "v", "CERT-001"]);
        assert!(matches!(args.cmd, CertifySubcommand::Verify(_)));
    }

    #[test]
    fn parse_mirror() {
        let args = Certify::parse_from(["certify", "mirror", "serve", "--bind", "127.0.0.1:0"]);
        let CertifySubcommand::Mirror(MirrorSubcommand::Serve(serve)) = args.cmd else {
            panic!("expected mirror serve")
        };
        assert_eq!(serve.mirror.mirror_bind, Some("127.0.0.1:0".parse().unwrap()));

        let args = Certify::parse_from(["certify", "mirror", "ls", "--mirror-url", "http://x"]);
        assert!(matches!(args.cmd, CertifySubcommand::Mirror(MirrorSubcommand::List(_))));
    }

    #[test]
    fn is_issuer_requires_address() {
        assert!(Certify::try_parse_from(["certify", "is-issuer", "nope"]).is_err());
        assert!(
            Certify::try_parse_from([
                "certify",
                "is-issuer",
                "0xBeF4EeDe07f7c40e24E523F0Ecc707F3B4621cEd"
            ])
            .is_ok()
        );
    }
}
