//! Bindings for the certificate registry contract.

use alloy_sol_types::sol;

sol! {
    /// The on-chain certificate registry.
    ///
    /// `verifyCertificate` returns zero values for an id that was never issued.
    interface ICertificateRegistry {
        #[derive(Debug)]
        function admin() external view returns (address);
        #[derive(Debug)]
        function authorizedIssuers(address issuer) external view returns (bool);
        #[derive(Debug)]
        function addIssuer(address issuer) external;
        #[derive(Debug)]
        function issueCertificate(
            string certId,
            string studentName,
            string course,
            string certHash
        ) external;
        #[derive(Debug)]
        function verifyCertificate(string certId) external view returns (
            string studentName,
            string course,
            address issuer,
            uint256 issuedAt,
            string certHash,
            bool isValid
        );
        #[derive(Debug)]
        function revokeCertificate(string certId) external;
    }
}
